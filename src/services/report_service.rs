// src/services/report_service.rs
//
// Relatório de prestação de serviços em PDF: o conteúdo é montado primeiro
// (`ReportLayout`) e só depois desenhado pelo genpdf.

use std::path::PathBuf;

use chrono::NaiveDate;
use genpdf::{elements, style, Alignment, Element};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{contracts::Contract, partners::Partner, record::Record, reports::ReportTotals},
    services::aggregation,
};

/// Identificação de quem emite o relatório (rodapé e assinatura).
#[derive(Debug, Clone, Default)]
pub struct ReportIssuer {
    pub name: String,
    pub nif: String,
    pub address: String,
    pub title: String,
    pub signoff: String,
}

/// Conteúdo do relatório, já com todos os textos resolvidos.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub addressed_to: Option<Vec<String>>,
    pub date: String,
    pub totals: ReportTotals,
    pub closing: Vec<String>,
    pub signature: Vec<String>,
    pub footer: String,
}

fn money(value: Decimal) -> String {
    format!("{:.2} €", value)
}

pub fn build_layout(
    contracts: &[Record<Contract>],
    partner: Option<&Partner>,
    issuer: &ReportIssuer,
    today: NaiveDate,
) -> ReportLayout {
    let addressed_to = partner.map(|p| {
        let mut lines = vec!["ENDEREÇADO A:".to_string(), p.name.to_uppercase()];
        if let Some(address) = p.address.as_deref().filter(|a| !a.trim().is_empty()) {
            lines.push(address.to_string());
        }
        let town = [p.postal_code.as_deref(), p.locality.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !town.is_empty() {
            lines.push(town);
        }
        if let Some(nif) = p.nif.as_deref().filter(|n| !n.trim().is_empty()) {
            lines.push(format!("NIF: {}", nif));
        }
        lines
    });

    ReportLayout {
        title: "Relatório de Prestação de Serviços".to_string(),
        addressed_to,
        date: format!("DATA: {}", today.format("%d/%m/%Y")),
        totals: aggregation::report_totals(contracts),
        closing: vec![
            "Caro parceiro,".to_string(),
            "Estamos ao dispor para qualquer esclarecimento necessário.".to_string(),
        ],
        signature: vec![issuer.signoff.clone(), issuer.title.clone()],
        footer: [issuer.name.as_str(), issuer.nif.as_str(), issuer.address.as_str()]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

#[derive(Clone)]
pub struct ReportService {
    fonts_dir: PathBuf,
    font_family: String,
    issuer: ReportIssuer,
}

impl ReportService {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>, issuer: ReportIssuer) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
            issuer,
        }
    }

    pub fn layout(
        &self,
        contracts: &[Record<Contract>],
        partner: Option<&Partner>,
        today: NaiveDate,
    ) -> ReportLayout {
        build_layout(contracts, partner, &self.issuer, today)
    }

    /// Gera o PDF. Sem fontes não há relatório: devolve erro e nenhum byte.
    pub fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|e| {
                AppError::PdfUnavailable(format!(
                    "fonte {} não encontrada em {}: {}",
                    self.font_family,
                    self.fonts_dir.display(),
                    e
                ))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(layout.title.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        doc.set_page_decorator(decorator);

        let bold = style::Style::new().bold();

        doc.push(
            elements::Paragraph::new(layout.title.clone())
                .aligned(Alignment::Center)
                .styled(bold.with_font_size(18)),
        );
        doc.push(elements::Break::new(2));

        // --- DESTINATÁRIO ---
        if let Some(lines) = &layout.addressed_to {
            for (i, line) in lines.iter().enumerate() {
                let paragraph = elements::Paragraph::new(line.clone());
                if i < 2 {
                    doc.push(paragraph.styled(bold));
                } else {
                    doc.push(paragraph);
                }
            }
            doc.push(elements::Break::new(1));
        }

        doc.push(elements::Paragraph::new(layout.date.clone()).styled(bold));
        doc.push(elements::Break::new(1.5));

        // --- TABELA ---
        let mut table = elements::TableLayout::new(vec![3, 1]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        table
            .row()
            .element(elements::Paragraph::new("DESCRIÇÃO").styled(bold))
            .element(elements::Paragraph::new("TOTAL").styled(bold))
            .push()
            .map_err(|e| AppError::PdfRenderError(e.to_string()))?;
        table
            .row()
            .element(elements::Paragraph::new("Prestação de serviços"))
            .element(elements::Paragraph::new(money(layout.totals.subtotal)).aligned(Alignment::Right))
            .push()
            .map_err(|e| AppError::PdfRenderError(e.to_string()))?;
        doc.push(table);
        doc.push(elements::Break::new(1.5));

        // --- TOTAIS ---
        let totals = [
            format!("SUBTOTAL: {}", money(layout.totals.subtotal)),
            format!("Taxa 23%: {}", money(layout.totals.tax)),
            format!("TOTAL: {}", money(layout.totals.total)),
        ];
        for line in totals {
            doc.push(elements::Paragraph::new(line).aligned(Alignment::Right).styled(bold));
        }
        doc.push(elements::Break::new(2));

        for line in &layout.closing {
            doc.push(elements::Paragraph::new(line.clone()));
        }
        doc.push(elements::Break::new(2));

        for line in layout.signature.iter().filter(|l| !l.trim().is_empty()) {
            doc.push(elements::Paragraph::new(line.clone()).aligned(Alignment::Center).styled(bold));
        }

        // --- RODAPÉ ---
        if !layout.footer.is_empty() {
            doc.push(elements::Break::new(3));
            doc.push(
                elements::Paragraph::new(layout.footer.clone())
                    .aligned(Alignment::Center)
                    .styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::PdfRenderError(e.to_string()))?;

        tracing::info!("📄 Relatório gerado ({} bytes)", buffer.len());
        Ok(buffer)
    }
}
