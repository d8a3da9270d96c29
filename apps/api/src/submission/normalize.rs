//! Request Normalizer — turns the collected multipart field map into a
//! canonical `Submission`.
//!
//! Form encodings are loosely typed: a repeated group sub-field may arrive as
//! a scalar (one value) or an array (repeated keys, with or without a `[]`
//! name suffix). The collector aggregates every field into an ordered
//! `Vec<String>`, so by the time `normalize` runs, a scalar and a one-element
//! array are indistinguishable. Downstream code never sees the ambiguous
//! shape.

use std::collections::HashMap;

use crate::errors::AppError;
use crate::submission::models::{EducationEntry, ExperienceEntry, Submission};

/// Collected form fields: canonical field name → values in submission order.
pub type FormFields = HashMap<String, Vec<String>>;

/// Strips the `[]` array suffix some form encodings append to repeated field
/// names, so `highestEducation` and `highestEducation[]` land in one bucket.
pub fn canonical_field_name(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

/// Pure transformation from raw fields to a canonical `Submission`.
/// Every failure is a `Validation` error; nothing is persisted or notified
/// for a submission that does not normalize.
pub fn normalize(fields: &FormFields) -> Result<Submission, AppError> {
    Ok(Submission {
        first_name: required_scalar(fields, "firstName")?,
        last_name: required_scalar(fields, "lastName")?,
        email: required_scalar(fields, "email")?,
        phone: required_scalar(fields, "phone")?,
        profession: optional_scalar(fields, "profession"),
        address: optional_scalar(fields, "address"),
        education: zip_education(fields)?,
        experience: zip_experience(fields)?,
        skills: normalize_skills(fields),
        resume: None,
        job_position: optional_scalar(fields, "jobPosition"),
    })
}

/// First value of a required scalar field, trimmed. Missing or blank is a
/// validation failure.
fn required_scalar(fields: &FormFields, name: &str) -> Result<String, AppError> {
    match optional_scalar(fields, name) {
        Some(value) => Ok(value),
        None => Err(AppError::Validation(format!(
            "required field '{name}' is missing or empty"
        ))),
    }
}

fn optional_scalar(fields: &FormFields, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(|values| values.iter().map(|v| v.trim()).find(|v| !v.is_empty()))
        .map(str::to_string)
}

fn group_values<'a>(fields: &'a FormFields, name: &str) -> &'a [String] {
    fields.get(name).map(Vec::as_slice).unwrap_or(&[])
}

/// Zips the education group's parallel arrays positionally, preserving
/// submission order. Unequal lengths fail loudly: silently truncating or
/// padding would misattribute an applicant's data.
fn zip_education(fields: &FormFields) -> Result<Vec<EducationEntry>, AppError> {
    let highest = group_values(fields, "highestEducation");
    let field_of_study = group_values(fields, "fieldOfStudy");
    let institute = group_values(fields, "institute");

    check_group_lengths(
        "education",
        &[
            ("highestEducation", highest.len()),
            ("fieldOfStudy", field_of_study.len()),
            ("institute", institute.len()),
        ],
    )?;

    Ok(highest
        .iter()
        .zip(field_of_study)
        .zip(institute)
        .map(|((he, fs), inst)| EducationEntry {
            highest_education: he.trim().to_string(),
            field_of_study: fs.trim().to_string(),
            institute: inst.trim().to_string(),
        })
        .collect())
}

fn zip_experience(fields: &FormFields) -> Result<Vec<ExperienceEntry>, AppError> {
    let company = group_values(fields, "companyName");
    let position = group_values(fields, "positionTitle");
    let years = group_values(fields, "yearsOfExperience");

    check_group_lengths(
        "experience",
        &[
            ("companyName", company.len()),
            ("positionTitle", position.len()),
            ("yearsOfExperience", years.len()),
        ],
    )?;

    company
        .iter()
        .zip(position)
        .zip(years)
        .map(|((co, title), yrs)| {
            let years_of_experience = yrs.trim().parse::<f64>().map_err(|_| {
                AppError::Validation(format!(
                    "yearsOfExperience value '{}' is not a number",
                    yrs.trim()
                ))
            })?;
            Ok(ExperienceEntry {
                company_name: co.trim().to_string(),
                position_title: title.trim().to_string(),
                years_of_experience,
            })
        })
        .collect()
}

fn check_group_lengths(group: &str, lengths: &[(&str, usize)]) -> Result<(), AppError> {
    let first = lengths[0].1;
    if lengths.iter().all(|&(_, len)| len == first) {
        return Ok(());
    }
    let counts = lengths
        .iter()
        .map(|(name, len)| format!("{name}={len}"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::Validation(format!(
        "{group} group has mismatched entry counts ({counts})"
    )))
}

/// Skills arrive either as one delimited string or as repeated values.
/// A single value is split on `,`; repeated values are taken as already
/// itemized. Items are trimmed and empties dropped.
fn normalize_skills(fields: &FormFields) -> Vec<String> {
    let values = group_values(fields, "skills");
    let items: Vec<&str> = match values {
        [single] => single.split(',').collect(),
        many => many.iter().map(String::as_str).collect(),
    };
    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
