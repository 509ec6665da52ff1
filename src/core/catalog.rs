//! Static catalog of importable/exportable contact fields

use serde::Serialize;
use std::fmt;

/// Value type of a contact field, drives coercion and template examples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Url,
    Date,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single contact attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

const fn field(
    key: &'static str,
    label: &'static str,
    required: bool,
    field_type: FieldType,
) -> FieldDefinition {
    FieldDefinition {
        key,
        label,
        required,
        field_type,
    }
}

/// Every contact attribute, in display order
pub const CONTACT_FIELDS: &[FieldDefinition] = &[
    field("firstName", "First Name", true, FieldType::Text),
    field("lastName", "Last Name", true, FieldType::Text),
    field("email", "Email", false, FieldType::Email),
    field("alternateEmail", "Alternate Email", false, FieldType::Email),
    field("phone", "Phone", false, FieldType::Text),
    field("mobile", "Mobile", false, FieldType::Text),
    field("whatsappNumber", "WhatsApp Number", false, FieldType::Text),
    field("company", "Company", false, FieldType::Text),
    field("jobTitle", "Job Title", false, FieldType::Text),
    field("department", "Department", false, FieldType::Text),
    field("website", "Website", false, FieldType::Url),
    field("linkedinUrl", "LinkedIn URL", false, FieldType::Url),
    field("twitterHandle", "Twitter Handle", false, FieldType::Text),
    field("addressLine1", "Address Line 1", false, FieldType::Text),
    field("addressLine2", "Address Line 2", false, FieldType::Text),
    field("city", "City", false, FieldType::Text),
    field("state", "State", false, FieldType::Text),
    field("postalCode", "Postal Code", false, FieldType::Text),
    field("country", "Country", false, FieldType::Text),
    field("gstin", "GSTIN", false, FieldType::Text),
    field("pan", "PAN", false, FieldType::Text),
    field("dateOfBirth", "Date of Birth", false, FieldType::Date),
    field("anniversary", "Anniversary", false, FieldType::Date),
    field("leadSource", "Lead Source", false, FieldType::Text),
    field("leadStatus", "Lead Status", false, FieldType::Text),
    field("lifecycleStage", "Lifecycle Stage", false, FieldType::Text),
    field("leadScore", "Lead Score", false, FieldType::Number),
    field("annualRevenue", "Annual Revenue", false, FieldType::Number),
    field("employeeCount", "Employee Count", false, FieldType::Number),
    field("emailOptIn", "Email Opt In", false, FieldType::Boolean),
    field("smsOptIn", "SMS Opt In", false, FieldType::Boolean),
    field("whatsappOptIn", "WhatsApp Opt In", false, FieldType::Boolean),
    field("doNotContact", "Do Not Contact", false, FieldType::Boolean),
    field("lastContactedAt", "Last Contacted", false, FieldType::Date),
    field("tags", "Tags", false, FieldType::Text),
    field("notes", "Notes", false, FieldType::Text),
];

/// Look up a field by its key
pub fn find_field<'a>(catalog: &'a [FieldDefinition], key: &str) -> Option<&'a FieldDefinition> {
    catalog.iter().find(|f| f.key == key)
}

/// Fields a row cannot be imported without
pub fn required_fields(catalog: &[FieldDefinition]) -> impl Iterator<Item = &FieldDefinition> {
    catalog.iter().filter(|f| f.required)
}

impl FieldDefinition {
    /// Illustrative value used in the import template
    pub fn example_value(&self) -> &'static str {
        match self.key {
            "firstName" => "John",
            "lastName" => "Doe",
            "phone" => "+91 98765 43210",
            "mobile" => "+91 91234 56789",
            "whatsappNumber" => "+919876543210",
            "company" => "Acme Traders Pvt Ltd",
            "jobTitle" => "Purchase Manager",
            "department" => "Procurement",
            "twitterHandle" => "@johndoe",
            "addressLine1" => "221 MG Road",
            "addressLine2" => "Suite 4",
            "city" => "Bengaluru",
            "state" => "Karnataka",
            "postalCode" => "560001",
            "country" => "India",
            "gstin" => "29ABCDE1234F1Z5",
            "pan" => "ABCDE1234F",
            "leadSource" => "Website",
            "leadStatus" => "New",
            "lifecycleStage" => "Lead",
            "tags" => "vip",
            "notes" => "Met at trade fair",
            _ => match self.field_type {
                FieldType::Email => "john.doe@example.com",
                FieldType::Url => "https://example.com",
                FieldType::Date => "2024-01-15",
                FieldType::Number => "100",
                FieldType::Boolean => "true",
                FieldType::Text => "",
            },
        }
    }
}
