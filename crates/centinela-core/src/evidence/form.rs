use crate::analysis::{AnalysisRequest, ProductType, Role};
use crate::error::Result;

use super::model::{EvidenceKey, EvidenceSet};

/// Local state behind the analysis form.
///
/// Holds the selected role, product type and evidence flags. It never talks
/// to the network; [`EvidenceForm::snapshot`] is the only way its contents
/// leave the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceForm {
    role: Role,
    product_type: ProductType,
    evidence: EvidenceSet,
}

impl EvidenceForm {
    /// Creates a form with default role/product type and no evidence.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    pub fn evidence(&self) -> &EvidenceSet {
        &self.evidence
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn set_product_type(&mut self, product_type: ProductType) {
        self.product_type = product_type;
    }

    /// Sets the role from operator input; unknown names leave the form unchanged.
    pub fn set_role_named(&mut self, name: &str) -> Result<Role> {
        let role = Role::parse(name)?;
        self.role = role;
        Ok(role)
    }

    /// Sets the product type from operator input; unknown names leave the form unchanged.
    pub fn set_product_type_named(&mut self, name: &str) -> Result<ProductType> {
        let product_type = ProductType::parse(name)?;
        self.product_type = product_type;
        Ok(product_type)
    }

    pub fn toggle(&mut self, key: EvidenceKey) -> bool {
        self.evidence.toggle(key);
        self.evidence.is_present(key)
    }

    /// Toggles a key given by name and returns the key with its new flag.
    pub fn toggle_named(&mut self, name: &str) -> Result<(EvidenceKey, bool)> {
        let key = EvidenceKey::parse(name)?;
        Ok((key, self.toggle(key)))
    }

    /// Copies the current role, product type and evidence into a request.
    /// Later edits to the form do not affect the returned value.
    pub fn snapshot(&self) -> AnalysisRequest {
        AnalysisRequest {
            role: self.role,
            product_type: self.product_type,
            evidence: self.evidence,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_defaults() {
        let form = EvidenceForm::new();
        assert_eq!(form.role(), Role::Student);
        assert_eq!(form.product_type(), ProductType::Essay);
        assert_eq!(form.evidence().present_count(), 0);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let mut form = EvidenceForm::new();
        form.toggle(EvidenceKey::InconsistentData);
        form.set_role(Role::SupervisingResearcher);

        let snapshot = form.snapshot();

        form.toggle(EvidenceKey::InconsistentData);
        form.toggle(EvidenceKey::StyleMismatch);
        form.set_product_type(ProductType::Thesis);

        assert_eq!(snapshot.role, Role::SupervisingResearcher);
        assert_eq!(snapshot.product_type, ProductType::Essay);
        assert!(snapshot.evidence.is_present(EvidenceKey::InconsistentData));
        assert!(!snapshot.evidence.is_present(EvidenceKey::StyleMismatch));
    }

    #[test]
    fn test_toggle_named_reports_new_flag() {
        let mut form = EvidenceForm::new();
        assert_eq!(
            form.toggle_named("suspicious timing").unwrap(),
            (EvidenceKey::SuspiciousTiming, true)
        );
        assert_eq!(
            form.toggle_named("tiempo_sospechoso").unwrap(),
            (EvidenceKey::SuspiciousTiming, false)
        );
    }

    #[test]
    fn test_unknown_names_leave_form_unchanged() {
        let mut form = EvidenceForm::new();
        form.set_role(Role::ExternalCoResearcher);
        let before = form.clone();

        assert!(form.toggle_named("ghostwriting").is_err());
        assert!(form.set_role_named("janitor").is_err());
        assert!(form.set_product_type_named("novel").is_err());
        assert_eq!(form, before);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = EvidenceForm::new();
        form.set_product_type(ProductType::TechnicalReport);
        form.toggle(EvidenceKey::WeakDefense);
        form.reset();
        assert_eq!(form, EvidenceForm::new());
    }
}
