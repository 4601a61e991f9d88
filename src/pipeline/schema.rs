//! Customer schema: the fields a record carries and their domains

/// Kind of a customer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-vocabulary label
    Categorical,
    /// Non-negative numeric magnitude
    Numeric,
}

/// Static description of one customer field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Column name as the classifier knows it
    pub name: &'static str,
    /// Human-readable label used in prompts and reports
    pub label: &'static str,
    pub kind: FieldKind,
    /// Vocabulary for categorical fields, in display order
    pub vocabulary: &'static [&'static str],
    /// Typical (training-time) range for numeric fields
    pub typical_range: Option<(f64, f64)>,
}

impl FieldSpec {
    const fn categorical(
        name: &'static str,
        label: &'static str,
        vocabulary: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Categorical,
            vocabulary,
            typical_range: None,
        }
    }

    const fn numeric(name: &'static str, label: &'static str, range: (f64, f64)) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Numeric,
            vocabulary: &[],
            typical_range: Some(range),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == FieldKind::Numeric
    }

    /// True for Yes/No fields
    pub fn is_binary(&self) -> bool {
        self.vocabulary == YES_NO
    }
}

pub const YES_NO: &[&str] = &["No", "Yes"];

/// Tolerance for floating point comparison when checking 0/1 indicator values
const INDICATOR_TOLERANCE: f64 = 1e-9;

/// Map a 0/1 indicator to its Yes/No label
pub fn indicator_label(value: f64) -> Option<&'static str> {
    if value.abs() < INDICATOR_TOLERANCE {
        Some("No")
    } else if (value - 1.0).abs() < INDICATOR_TOLERANCE {
        Some("Yes")
    } else {
        None
    }
}

pub const GENDER: &str = "gender";
pub const SENIOR_CITIZEN: &str = "SeniorCitizen";
pub const PARTNER: &str = "Partner";
pub const DEPENDENTS: &str = "Dependents";
pub const TENURE: &str = "tenure";
pub const PHONE_SERVICE: &str = "PhoneService";
pub const MULTIPLE_LINES: &str = "MultipleLines";
pub const INTERNET_SERVICE: &str = "InternetService";
pub const ONLINE_SECURITY: &str = "OnlineSecurity";
pub const ONLINE_BACKUP: &str = "OnlineBackup";
pub const DEVICE_PROTECTION: &str = "DeviceProtection";
pub const TECH_SUPPORT: &str = "TechSupport";
pub const STREAMING_TV: &str = "StreamingTV";
pub const STREAMING_MOVIES: &str = "StreamingMovies";
pub const CONTRACT: &str = "Contract";
pub const PAPERLESS_BILLING: &str = "PaperlessBilling";
pub const PAYMENT_METHOD: &str = "PaymentMethod";
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const TOTAL_CHARGES: &str = "TotalCharges";

/// All customer fields, in the column order of the hand-encoded model.
pub static CUSTOMER_FIELDS: [FieldSpec; 19] = [
    FieldSpec::categorical(GENDER, "Gender", &["Male", "Female"]),
    FieldSpec::categorical(SENIOR_CITIZEN, "Senior Citizen", YES_NO),
    FieldSpec::categorical(PARTNER, "Partner", YES_NO),
    FieldSpec::categorical(DEPENDENTS, "Dependents", YES_NO),
    FieldSpec::numeric(TENURE, "Tenure (Months)", (0.0, 72.0)),
    FieldSpec::categorical(PHONE_SERVICE, "Phone Service", YES_NO),
    FieldSpec::categorical(MULTIPLE_LINES, "Multiple Lines", YES_NO),
    FieldSpec::categorical(INTERNET_SERVICE, "Internet Service", &["DSL", "Fiber optic", "No"]),
    FieldSpec::categorical(ONLINE_SECURITY, "Online Security", YES_NO),
    FieldSpec::categorical(ONLINE_BACKUP, "Online Backup", YES_NO),
    FieldSpec::categorical(DEVICE_PROTECTION, "Device Protection", YES_NO),
    FieldSpec::categorical(TECH_SUPPORT, "Tech Support", YES_NO),
    FieldSpec::categorical(STREAMING_TV, "Streaming TV", YES_NO),
    FieldSpec::categorical(STREAMING_MOVIES, "Streaming Movies", YES_NO),
    FieldSpec::categorical(
        CONTRACT,
        "Contract",
        &["Month-to-month", "One year", "Two year"],
    ),
    FieldSpec::categorical(PAPERLESS_BILLING, "Paperless Billing", YES_NO),
    FieldSpec::categorical(
        PAYMENT_METHOD,
        "Payment Method",
        &[
            "Electronic check",
            "Mailed check",
            "Bank transfer (automatic)",
            "Credit card (automatic)",
        ],
    ),
    FieldSpec::numeric(MONTHLY_CHARGES, "Monthly Charges ($)", (0.0, 500.0)),
    FieldSpec::numeric(TOTAL_CHARGES, "Total Charges ($)", (0.0, 20000.0)),
];

/// Look up a field by column name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    CUSTOMER_FIELDS.iter().find(|f| f.name == name)
}

/// Iterate over categorical fields only
pub fn categorical_fields() -> impl Iterator<Item = &'static FieldSpec> {
    CUSTOMER_FIELDS.iter().filter(|f| !f.is_numeric())
}

/// Iterate over numeric fields only
pub fn numeric_fields() -> impl Iterator<Item = &'static FieldSpec> {
    CUSTOMER_FIELDS.iter().filter(|f| f.is_numeric())
}
