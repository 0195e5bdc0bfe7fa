//! Validation of homework API payloads and rendering of status messages.

use serde_json::Value;
use tracing::debug;

use crate::error::HomeworkError;
use crate::verdicts;

/// Homework list extracted from a well-formed response.
#[derive(Debug, Clone, PartialEq)]
pub enum Homeworks {
    /// Nothing changed since the cursor.
    NoUpdates,
    /// Newest first; records are not inspected yet.
    Updated(Vec<Value>),
}

/// A response that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedResponse {
    pub homeworks: Homeworks,
    pub current_date: i64,
}

/// One submission as reported by the API. Fields are kept as raw JSON so that
/// a missing or unusable value is reported as missing, whatever its type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeworkRecord {
    pub homework_name: Option<Value>,
    pub status: Option<Value>,
}

impl HomeworkRecord {
    pub fn from_value(value: &Value) -> Result<Self, HomeworkError> {
        let Some(object) = value.as_object() else {
            return Err(HomeworkError::TypeMismatch(format!(
                "Домашняя работа имеет неверный формат: {}",
                value
            )));
        };

        Ok(Self {
            homework_name: object.get("homework_name").cloned(),
            status: object.get("status").cloned(),
        })
    }
}

/// Check that the payload matches the documented response shape.
pub fn check_response(response: &Value) -> Result<CheckedResponse, HomeworkError> {
    let Some(object) = response.as_object() else {
        return Err(HomeworkError::TypeMismatch(
            "Ответ от API имеет неверный тип объекта".to_string(),
        ));
    };

    let homeworks = match object.get("homeworks") {
        None => {
            return Err(HomeworkError::MissingKey(
                "В ответе API отсутствует ключ \"homeworks\"".to_string(),
            ))
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(HomeworkError::TypeMismatch(
                "Ответ от API имеет неверный тип по ключу \"homeworks\"".to_string(),
            ))
        }
    };

    let current_date = match object.get("current_date") {
        None => {
            return Err(HomeworkError::MissingKey(
                "В ответе API отсутствует ключ \"current_date\"".to_string(),
            ))
        }
        Some(value) => value.as_i64().ok_or_else(|| {
            HomeworkError::TypeMismatch(
                "Ответ от API имеет неверный тип по ключу \"current_date\"".to_string(),
            )
        })?,
    };

    debug!("API returned a well-formed response");

    let homeworks = if homeworks.is_empty() {
        Homeworks::NoUpdates
    } else {
        Homeworks::Updated(homeworks.clone())
    };

    Ok(CheckedResponse {
        homeworks,
        current_date,
    })
}

/// Render the notification text for one homework record.
pub fn parse_status(homework: &HomeworkRecord) -> Result<String, HomeworkError> {
    let name = match homework.homework_name.as_ref().and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(HomeworkError::MissingKey(
                "Имя работы отсутствует".to_string(),
            ))
        }
    };

    let raw_status = match &homework.status {
        None | Some(Value::Null) => {
            return Err(HomeworkError::MissingKey(
                "В домашней работе нет статуса".to_string(),
            ))
        }
        Some(status) => status,
    };

    let Some((status, verdict)) = raw_status
        .as_str()
        .and_then(|code| verdicts::verdict(code).map(|verdict| (code, verdict)))
    else {
        return Err(HomeworkError::MissingKey(format!(
            "Неизвестный статус домашней работы: {}",
            raw_status
        )));
    };

    // Every known status is non-empty, so this only trips if the table changes.
    if status.is_empty() {
        return Err(HomeworkError::UnexpectedStatus(
            "Статус домашней работы пуст".to_string(),
        ));
    }

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name, verdict
    ))
}
