// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Record;
use crate::utils::{fmt_money, fmt_rate};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// The numbers printed in one comparison cell.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteCell {
    pub unit_price: Option<Decimal>,
    pub quantity: Option<u64>,
    pub tax_rate: Option<Decimal>,
    pub discount_rate: Option<Decimal>,
    pub total: Option<Decimal>,
}

impl From<&Record> for QuoteCell {
    fn from(r: &Record) -> Self {
        QuoteCell {
            unit_price: r.unit_price,
            quantity: r.quantity,
            tax_rate: r.tax_rate,
            discount_rate: r.discount_rate,
            total: r.total,
        }
    }
}

/// One product with a column per supplier. An empty column prints as N/A.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductBlock {
    pub product: String,
    pub columns: Vec<Vec<QuoteCell>>,
}

impl ProductBlock {
    fn rows(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub suppliers: Vec<String>,
    pub products: Vec<ProductBlock>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Group rows by product (first appearance order), then by supplier. Supplier
/// columns are shared by every block and sorted alphabetically.
pub fn build_comparison(rows: &[&Record]) -> Comparison {
    let suppliers: Vec<String> = rows
        .iter()
        .map(|r| r.supplier.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut products: Vec<ProductBlock> = Vec::new();
    for r in rows {
        let idx = match products.iter().position(|p| p.product == r.product) {
            Some(idx) => idx,
            None => {
                products.push(ProductBlock {
                    product: r.product.clone(),
                    columns: vec![Vec::new(); suppliers.len()],
                });
                products.len() - 1
            }
        };
        // suppliers was built from these same rows
        if let Ok(col) = suppliers.binary_search(&r.supplier) {
            products[idx].columns[col].push(QuoteCell::from(*r));
        }
    }
    Comparison {
        suppliers,
        products,
    }
}

const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN: f32 = 10.0;
const HEADER_H: f32 = 7.0;
const LINE_H: f32 = 4.0;
const CELL_H: f32 = 5.0 * LINE_H + 2.0;
const PT_TO_MM: f32 = 0.3528;

// Helvetica averages about half an em per character.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn fit(text: &str, width: f32, size: f32) -> String {
    let max = (width / (size * 0.5 * PT_TO_MM)).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

struct Sheet<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    title: String,
    // distance from the top edge
    top: f32,
    pages: usize,
}

impl Sheet<'_> {
    fn text(&self, text: &str, size: f32, x: f32, top: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_H - top), font);
    }

    fn rect(&self, x: f32, top: f32, w: f32, h: f32) {
        let corner = |x: f32, top: f32| (Point::new(Mm(x), Mm(PAGE_H - top)), false);
        self.layer.add_line(Line {
            points: vec![
                corner(x, top),
                corner(x + w, top),
                corner(x + w, top + h),
                corner(x, top + h),
            ],
            is_closed: true,
        });
    }

    fn heading(&mut self) {
        let x = ((PAGE_W - text_width(&self.title, 12.0)) / 2.0).max(MARGIN);
        self.text(&self.title, 12.0, x, MARGIN + 5.0, true);
        self.top = MARGIN + 15.0;
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Page {}", self.pages + 1));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.heading();
    }

    fn ensure_room(&mut self, needed: f32) -> bool {
        if self.top + needed > PAGE_H - MARGIN {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn supplier_header(&self, suppliers: &[String], col_w: f32) {
        for (i, s) in suppliers.iter().enumerate() {
            let x = MARGIN + i as f32 * col_w;
            self.rect(x, self.top, col_w, HEADER_H);
            let label = fit(s, col_w - 2.0, 10.0);
            let lx = x + ((col_w - text_width(&label, 10.0)) / 2.0).max(1.0);
            self.text(&label, 10.0, lx, self.top + 5.0, true);
        }
    }

    fn cell(&self, cell: &QuoteCell, x: f32, col_w: f32, symbol: &str) {
        self.rect(x, self.top, col_w, CELL_H - 2.0);
        let lines = [
            format!("Price: {}", fmt_money(cell.unit_price, symbol)),
            format!("Qty: {}", cell.quantity.unwrap_or(0)),
            format!("Tax: {}", fmt_rate(cell.tax_rate)),
            format!("Disc: {}", fmt_rate(cell.discount_rate)),
            format!("Total: {}", fmt_money(cell.total, symbol)),
        ];
        for (i, line) in lines.iter().enumerate() {
            let baseline = self.top + LINE_H * (i as f32 + 1.0) - 0.5;
            self.text(&fit(line, col_w - 2.0, 8.0), 8.0, x + 1.0, baseline, false);
        }
    }
}

/// Render `report` as a landscape A4 PDF at `path`.
pub fn write_pdf(report: &Comparison, path: &Path, symbol: &str, date: NaiveDate) -> Result<()> {
    if report.is_empty() {
        return Err(anyhow!("Nothing to report"));
    }
    let title = format!("Quote comparison - {}", date.format("%d/%m/%Y"));
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(PAGE_W), Mm(PAGE_H), "Page 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Load PDF font: {}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Load PDF font: {}", e))?;

    let pages = {
        let mut sheet = Sheet {
            doc: &doc,
            layer: doc.get_page(page1).get_layer(layer1),
            regular,
            bold,
            title,
            top: 0.0,
            pages: 1,
        };
        sheet.heading();

        let col_w = (PAGE_W - 2.0 * MARGIN) / report.suppliers.len() as f32;
        for block in &report.products {
            // keep the product name, header and first row together
            sheet.ensure_room(9.0 + HEADER_H + CELL_H);
            sheet.text(
                &format!("Product: {}", block.product),
                10.0,
                MARGIN,
                sheet.top + 5.0,
                true,
            );
            sheet.top += 9.0;
            sheet.supplier_header(&report.suppliers, col_w);
            sheet.top += HEADER_H;

            for row in 0..block.rows() {
                if sheet.ensure_room(CELL_H) {
                    sheet.text(
                        &format!("Product: {} (cont.)", block.product),
                        10.0,
                        MARGIN,
                        sheet.top + 5.0,
                        true,
                    );
                    sheet.top += 9.0;
                    sheet.supplier_header(&report.suppliers, col_w);
                    sheet.top += HEADER_H;
                }
                for (col, quotes) in block.columns.iter().enumerate() {
                    let x = MARGIN + col as f32 * col_w;
                    match quotes.get(row) {
                        Some(cell) => sheet.cell(cell, x, col_w, symbol),
                        None if quotes.is_empty() && row == 0 => {
                            sheet.rect(x, sheet.top, col_w, CELL_H - 2.0);
                            let lx = x + ((col_w - text_width("N/A", 8.0)) / 2.0).max(1.0);
                            sheet.text("N/A", 8.0, lx, sheet.top + CELL_H / 2.0, false);
                        }
                        None => {}
                    }
                }
                sheet.top += CELL_H;
            }
            sheet.top += 8.0;
        }
        sheet.pages
    };

    let file = File::create(path).with_context(|| format!("Create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| anyhow!("Write PDF {}: {}", path.display(), e))?;
    info!(path = %path.display(), pages, products = report.products.len(), "report written");
    Ok(())
}
