use std::collections::HashMap;
use tracing::{debug, info};

use super::donation_field::{DonationField, EmailTag};
use super::form_field::FormField;
use super::FieldError;

/// Gap left after the current last field when nothing follows it.
const PRIORITY_STEP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Donation,
    Admin,
}

/// Position bookkeeping for one form
#[derive(Debug, Default)]
struct FormOrder {
    priorities: HashMap<String, f64>,
    last_registered: Option<f64>,
}

impl FormOrder {
    fn place(&mut self, key: &str, form: &FormField) -> f64 {
        let anchor = |name: &Option<String>| {
            name.as_ref()
                .and_then(|other| self.priorities.get(other))
                .copied()
        };

        let priority = match form.priority {
            Some(priority) => priority,
            None => match (anchor(&form.show_after), anchor(&form.show_before)) {
                (Some(after), _) => self.slot_after(after),
                (None, Some(before)) => self.slot_before(before),
                (None, None) => match self.last_registered {
                    Some(previous) => self.slot_after(previous),
                    None => PRIORITY_STEP,
                },
            },
        };

        self.priorities.insert(key.to_string(), priority);
        self.last_registered = Some(priority);
        priority
    }

    /// A position between `priority` and the next field after it
    fn slot_after(&self, priority: f64) -> f64 {
        self.priorities
            .values()
            .copied()
            .filter(|p| *p > priority)
            .min_by(f64::total_cmp)
            .map_or(priority + PRIORITY_STEP, |next| (priority + next) / 2.0)
    }

    /// A position between the field before `priority` and `priority`
    fn slot_before(&self, priority: f64) -> f64 {
        self.priorities
            .values()
            .copied()
            .filter(|p| *p < priority)
            .max_by(f64::total_cmp)
            .map_or(priority - 1.0, |previous| (previous + priority) / 2.0)
    }

    fn priority(&self, key: &str) -> f64 {
        self.priorities.get(key).copied().unwrap_or(f64::MAX)
    }
}

/// Every donation field registered during startup.
///
/// Fields keep their registration order; form listings are sorted by
/// position.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<DonationField>,
    index: HashMap<String, usize>,
    donation_order: FormOrder,
    admin_order: FormOrder,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field. A key can only be registered once.
    pub fn register(&mut self, field: DonationField) -> Result<(), FieldError> {
        if self.index.contains_key(field.key()) {
            return Err(FieldError::DuplicateKey(field.key().to_string()));
        }

        if let Some(form) = field.donation_form() {
            let priority = self.donation_order.place(field.key(), form);
            debug!("Donation form position of '{}': {}", field.key(), priority);
        }
        if let Some(form) = field.admin_form() {
            self.admin_order.place(field.key(), form);
        }

        info!("Registered donation field '{}'", field.key());
        self.index.insert(field.key().to_string(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&DonationField> {
        self.index.get(key).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in registration order
    pub fn all(&self) -> impl Iterator<Item = &DonationField> {
        self.fields.iter()
    }

    /// Fields shown in a form, in display order
    pub fn form_fields(&self, kind: FormKind) -> Vec<&DonationField> {
        let (order, in_form): (&FormOrder, fn(&DonationField) -> bool) = match kind {
            FormKind::Donation => (&self.donation_order, |f| f.donation_form().is_some()),
            FormKind::Admin => (&self.admin_order, |f| f.admin_form().is_some()),
        };

        let mut fields: Vec<&DonationField> = self.fields.iter().filter(|f| in_form(f)).collect();
        // Stable sort keeps registration order for equal positions
        fields.sort_by(|a, b| order.priority(a.key()).total_cmp(&order.priority(b.key())));
        fields
    }

    pub fn donation_form_fields(&self) -> Vec<&DonationField> {
        self.form_fields(FormKind::Donation)
    }

    pub fn admin_form_fields(&self) -> Vec<&DonationField> {
        self.form_fields(FormKind::Admin)
    }

    pub fn meta_fields(&self) -> Vec<&DonationField> {
        self.fields.iter().filter(|f| f.show_in_meta()).collect()
    }

    pub fn export_fields(&self) -> Vec<&DonationField> {
        self.fields.iter().filter(|f| f.show_in_export()).collect()
    }

    pub fn email_tags(&self) -> Vec<(&str, &EmailTag)> {
        self.fields
            .iter()
            .filter_map(|f| f.email_tag().map(|tag| (f.key(), tag)))
            .collect()
    }
}
