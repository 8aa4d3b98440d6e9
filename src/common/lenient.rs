// src/common/lenient.rs
//
// Os documentos são "schemaless": os formulários antigos gravavam números como texto,
// campos vazios como "" e datas em formatos variados. Estes deserializadores aceitam
// tudo isso e devolvem `None` em vez de falhar o documento inteiro.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Converte um valor JSON (número ou texto) num `Decimal`.
/// Aceita vírgula decimal ("1500,50"). Vazio, nulo ou ilegível -> `None`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Decimal::from_str(&trimmed.replace(',', ".")).ok()
        }
        _ => None,
    }
}

/// Interpreta uma data de documento: "YYYY-MM-DD" ou um timestamp RFC 3339.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
}

pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Booleanos de formulário: `true`, "true", "Sim", "on".
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "sim" | "on" | "1"),
        Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        _ => false,
    })
}

/// Enum desconhecido ou em falta -> `None` (ex: `tipoServico: ""`).
pub fn enumeration<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Qualquer estrutura que não encaixe no tipo esperado volta ao valor por omissão.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Montantes obrigatórios: ilegível ou em falta vale zero (a validação trata do resto).
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value).unwrap_or_default())
}

/// Os selects "Sim"/"Não" dos formulários. Lê com `flag`, escreve no mesmo formato.
pub fn yes_no<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "Sim" } else { "Não" })
}
