use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// Generated on insert; `0` until then.
    pub id: i64,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl Collaborator {
    pub fn new(login: &str, first_name: &str, last_name: &str) -> Self {
        Collaborator {
            id: 0,
            login: login.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_active: true,
        }
    }
}

/// Sort column of a collaborator listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CollaboratorOrder {
    Id,
    #[default]
    Login,
    FirstName,
    LastName,
    IsActive,
}

impl CollaboratorOrder {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            CollaboratorOrder::Id => "clb_id",
            CollaboratorOrder::Login => "clb_login",
            CollaboratorOrder::FirstName => "clb_first_name",
            CollaboratorOrder::LastName => "clb_last_name",
            CollaboratorOrder::IsActive => "clb_is_active",
        }
    }
}

/// Sorted and paged collaborator selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorQuery {
    pub order_by: CollaboratorOrder,
    pub ascending: bool,
    pub only_active: bool,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl Default for CollaboratorQuery {
    fn default() -> Self {
        CollaboratorQuery {
            order_by: CollaboratorOrder::Login,
            ascending: true,
            only_active: false,
            offset: None,
            limit: None,
        }
    }
}
