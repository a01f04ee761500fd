use serde::Deserialize;

/// How a notification's audience is selected from the profiles table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientFilter {
    /// Every profile.
    All,
    /// Profiles whose `role` equals the value.
    Role(String),
    /// The given user plus every staff profile owned by them.
    Business { user_id: String },
}

impl RecipientFilter {
    /// An absent or empty role selects everyone.
    pub fn for_role(target_role: Option<&str>) -> Self {
        match target_role {
            Some(role) if !role.is_empty() => RecipientFilter::Role(role.to_string()),
            _ => RecipientFilter::All,
        }
    }

    pub fn for_business(user_id: &str) -> Self {
        RecipientFilter::Business {
            user_id: user_id.to_string(),
        }
    }

    /// PostgREST query parameters selecting the matching profile ids.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("select", "id".to_string())];
        match self {
            RecipientFilter::All => {}
            RecipientFilter::Role(role) => params.push(("role", format!("eq.{}", role))),
            RecipientFilter::Business { user_id } => {
                let user_id = quote_filter_value(user_id);
                params.push((
                    "or",
                    format!("(id.eq.{},owner_id.eq.{})", user_id, user_id),
                ));
            }
        }
        params
    }
}

/// Quote a value for use inside a PostgREST logic tree so that reserved
/// characters (`,` `.` `(` `)`) in caller input cannot change the filter.
pub fn quote_filter_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A `profiles` row as selected for recipient resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: String,
}

/// Collect the external user ids, dropping empty identifiers.
pub fn external_user_ids(rows: Vec<ProfileRow>) -> Vec<String> {
    rows.into_iter()
        .map(|row| row.id)
        .filter(|id| !id.is_empty())
        .collect()
}
