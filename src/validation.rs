//! Field rules for contact input
//!
//! Validation never stops at the first problem: every violated field is
//! recorded so the caller can fix them all in one round trip.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::error::ValidationErrors;
use crate::model::ContactInput;

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().\-]*[0-9][0-9 ().\-]*$").expect("valid phone regex"));

/// Trimmed, validated contact fields ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Input after trimming, with blank values turned into `None`
#[derive(Debug, Validate)]
struct ContactDraft {
    #[validate(
        required(message = "first name is required"),
        length(max = 50, message = "first name cannot exceed 50 characters")
    )]
    first_name: Option<String>,

    #[validate(
        required(message = "last name is required"),
        length(max = 50, message = "last name cannot exceed 50 characters")
    )]
    last_name: Option<String>,

    #[validate(
        required(message = "email is required"),
        length(max = 100, message = "email cannot exceed 100 characters"),
        email(message = "email is not a valid address")
    )]
    email: Option<String>,

    #[validate(
        length(max = 20, message = "phone number cannot exceed 20 characters"),
        regex(path = *PHONE_REGEX, message = "phone number is not valid")
    )]
    phone_number: Option<String>,

    #[validate(length(max = 200, message = "address cannot exceed 200 characters"))]
    address: Option<String>,
}

impl From<&ContactInput> for ContactDraft {
    fn from(input: &ContactInput) -> Self {
        Self {
            first_name: normalize(input.first_name.as_deref()),
            last_name: normalize(input.last_name.as_deref()),
            email: normalize(input.email.as_deref()),
            phone_number: normalize(input.phone_number.as_deref()),
            address: normalize(input.address.as_deref()),
        }
    }
}

pub fn validate_contact(input: &ContactInput) -> Result<ContactFields, ValidationErrors> {
    let draft = ContactDraft::from(input);
    if let Err(errors) = draft.validate() {
        return Err(field_errors(&errors));
    }

    // required() passed, so the mandatory fields are present
    Ok(ContactFields {
        first_name: draft.first_name.unwrap_or_default(),
        last_name: draft.last_name.unwrap_or_default(),
        email: draft.email.unwrap_or_default(),
        phone_number: draft.phone_number,
        address: draft.address,
    })
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Re-keys validator errors by wire field name
fn field_errors(errors: &validator::ValidationErrors) -> ValidationErrors {
    let mut collected = ValidationErrors::new();
    for (field, problems) in errors.field_errors() {
        let name = wire_name(&field);
        for problem in problems.iter() {
            let message = match &problem.message {
                Some(message) => message.to_string(),
                None => problem.code.to_string(),
            };
            collected.add(name, message);
        }
    }
    collected
}

fn wire_name(field: &str) -> &str {
    match field {
        "first_name" => "firstName",
        "last_name" => "lastName",
        "phone_number" => "phoneNumber",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first: &str, last: &str, email: &str) -> ContactInput {
        ContactInput {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: Some(email.to_string()),
            phone_number: None,
            address: None,
        }
    }

    #[test]
    fn accepts_minimal_contact_and_trims() {
        let fields = validate_contact(&input("  Ada ", "Lovelace", " ada@x ")).unwrap();
        assert_eq!(fields.first_name, "Ada");
        assert_eq!(fields.email, "ada@x");
        assert_eq!(fields.phone_number, None);
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = validate_contact(&ContactInput::default()).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["email", "firstName", "lastName"]);
        assert_eq!(errors.messages("firstName"), ["first name is required"]);
    }

    #[test]
    fn whitespace_only_names_are_missing() {
        let errors = validate_contact(&input("   ", "\t", "a@x")).unwrap_err();
        assert!(errors.contains("firstName"));
        assert!(errors.contains("lastName"));
        assert!(!errors.contains("email"));
    }

    #[test]
    fn rejects_overlong_fields() {
        let mut long = input(&"a".repeat(51), &"b".repeat(50), "a@x");
        long.address = Some("c".repeat(201));
        long.phone_number = Some("1".repeat(21));

        let errors = validate_contact(&long).unwrap_err();
        assert!(errors.contains("firstName"));
        assert!(!errors.contains("lastName"));
        assert!(errors.contains("address"));
        assert!(errors.contains("phoneNumber"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(validate_contact(&input(&"é".repeat(50), "B", "a@x")).is_ok());
    }

    #[test]
    fn email_syntax() {
        for valid in ["a@x", "Alice@X.com", "first.last+tag@sub.example.org"] {
            assert!(validate_contact(&input("A", "B", valid)).is_ok(), "{valid}");
        }
        for invalid in ["plain", "@x.com", "a@", "a@@x", "a b@x.com", "a@x@y"] {
            let errors = validate_contact(&input("A", "B", invalid)).unwrap_err();
            assert!(errors.contains("email"), "{invalid}");
        }
    }

    #[test]
    fn phone_syntax() {
        let mut contact = input("A", "B", "a@x");
        contact.phone_number = Some("+33 (0)1 23-45.67".to_string());
        assert!(validate_contact(&contact).is_ok());

        contact.phone_number = Some("call me".to_string());
        assert!(validate_contact(&contact).unwrap_err().contains("phoneNumber"));

        contact.phone_number = Some("()".to_string());
        assert!(validate_contact(&contact).unwrap_err().contains("phoneNumber"));
    }

    #[test]
    fn blank_optional_fields_become_absent() {
        let mut contact = input("A", "B", "a@x");
        contact.phone_number = Some("  ".to_string());
        contact.address = Some(String::new());

        let fields = validate_contact(&contact).unwrap();
        assert_eq!(fields.phone_number, None);
        assert_eq!(fields.address, None);
    }
}
