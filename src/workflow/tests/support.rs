//! Shared fixtures for workflow unit tests.

use rstest::fixture;

use crate::workflow::domain::{CustomerId, LoanTerms, Role, User};

/// One user per role.
#[derive(Debug, Clone)]
pub(super) struct Staff {
    pub(super) staf_input: User,
    pub(super) admin_kredit: User,
    pub(super) analis: User,
    pub(super) pemutus: User,
    pub(super) admin: User,
}

impl Staff {
    pub(super) fn all(&self) -> Vec<User> {
        vec![
            self.staf_input.clone(),
            self.admin_kredit.clone(),
            self.analis.clone(),
            self.pemutus.clone(),
            self.admin.clone(),
        ]
    }
}

impl Staff {
    pub(super) fn with_role(&self, role: Role) -> Option<&User> {
        [
            &self.staf_input,
            &self.admin_kredit,
            &self.analis,
            &self.pemutus,
            &self.admin,
        ]
        .into_iter()
        .find(|user| user.role() == role)
    }
}

#[fixture]
pub(super) fn staff() -> Staff {
    Staff {
        staf_input: User::new("Sari", Role::StafInput),
        admin_kredit: User::new("Agus", Role::AdminKredit),
        analis: User::new("Rina", Role::Analis),
        pemutus: User::new("Hendra", Role::Pemutus),
        admin: User::new("Dewi", Role::Admin),
    }
}

pub(super) fn terms() -> LoanTerms {
    LoanTerms::new(50_000_000, "Modal kerja toko", 24, 1_150).expect("valid loan terms")
}

pub(super) fn customer() -> CustomerId {
    CustomerId::new()
}
