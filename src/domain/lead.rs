use crate::validation::digits_only;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country_code: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_country_code: String,
    pub phone_national_number: String,
    pub submitted_at: DateTime<Utc>,
    pub source_tag: String,
}

impl LeadRecord {
    pub fn from_form(form: &LeadForm, submitted_at: DateTime<Utc>, source_tag: &str) -> Self {
        Self {
            email: form.email.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            phone_country_code: form.country_code.trim().to_string(),
            phone_national_number: form.phone_number.trim().to_string(),
            submitted_at,
            source_tag: source_tag.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn phone(&self) -> String {
        format!(
            "{}{}",
            self.phone_country_code,
            digits_only(&self.phone_national_number)
        )
    }
}
