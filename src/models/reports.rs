// src/models/reports.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Valor dos selects que desliga um filtro.
pub const ALL: &str = "Todos";

fn all() -> String {
    ALL.to_string()
}

/// Filtros do ecrã de relatórios. Chegam como query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    // YYYY-MM-DD, inclusivo
    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default = "all")]
    pub comercial: String,

    #[serde(default = "all")]
    pub tipo_servico: String,

    #[serde(default = "all")]
    pub estado: String,

    #[serde(default = "all")]
    pub fornecedor: String,

    #[serde(default = "all")]
    pub financeira: String,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            comercial: all(),
            tipo_servico: all(),
            estado: all(),
            fornecedor: all(),
            financeira: all(),
        }
    }
}

impl ReportFilter {
    /// Nome do ficheiro do relatório: pelo fornecedor escolhido, ou "geral".
    /// Só letras, dígitos, espaços, `-` e `.` passam; o resto vira `_` (vai parar a um cabeçalho HTTP).
    pub fn file_name(&self) -> String {
        match self.selected_supplier() {
            None => "relatorio_geral.pdf".to_string(),
            Some(partner) => {
                let safe: String = partner
                    .chars()
                    .map(|c| if c.is_alphanumeric() || matches!(c, ' ' | '-' | '.') { c } else { '_' })
                    .collect();
                format!("relatorio_{}.pdf", safe)
            }
        }
    }

    pub fn selected_supplier(&self) -> Option<&str> {
        let partner = self.fornecedor.trim();
        (!partner.is_empty() && partner != ALL).then_some(partner)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ReportTotals {
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    // IVA a 23%
    #[serde(rename = "iva")]
    #[schema(value_type = f64)]
    pub tax: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_falls_back_to_generic() {
        let mut filter = ReportFilter::default();
        assert_eq!(filter.file_name(), "relatorio_geral.pdf");
        assert_eq!(filter.selected_supplier(), None);

        filter.fornecedor = "Auto Lda".into();
        assert_eq!(filter.file_name(), "relatorio_Auto Lda.pdf");
        assert_eq!(filter.selected_supplier(), Some("Auto Lda"));
    }

    #[test]
    fn file_name_is_safe_inside_content_disposition() {
        let filter = ReportFilter {
            fornecedor: "Auto \"Sul\"\nLda/Porto".into(),
            ..Default::default()
        };
        let name = filter.file_name();
        assert_eq!(name, "relatorio_Auto _Sul__Lda_Porto.pdf");

        let header = format!("attachment; filename=\"{}\"", name);
        assert!(axum::http::HeaderValue::from_str(&header).is_ok());
    }
}
