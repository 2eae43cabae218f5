//! Client screen commands

use rand::Rng;
use tracing::{info, warn};

use crate::db::{self, Client, ClientSummary, RecordStore, UpsertOutcome};
use crate::models::ClientForm;
use crate::notify::Notice;

/// What a form submission did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmendOutcome {
    pub client_id: i64,
    pub outcome: UpsertOutcome,
}

/// Refresh the client list for the current search text
pub fn search_clients(store: &RecordStore, text: &str) -> Vec<ClientSummary> {
    db::clients::search_clients(store, text)
}

/// Load the client behind a list entry such as `"123456: Alice: ..."`.
pub fn load_client(store: &RecordStore, list_entry: &str) -> Option<Client> {
    let client_id = list_entry.split(':').next()?.trim().parse().ok()?;
    db::clients::get_client(store, client_id)
}

/// Save the client form.
///
/// A blank id creates a new client under a freshly generated id. An id that
/// is already stored overwrites that client's fields with the form's,
/// blanks included. An id that is not stored is refused.
pub fn amend_client<R: Rng>(
    store: &mut RecordStore,
    form: ClientForm,
    rng: &mut R,
) -> Option<AmendOutcome> {
    let client_id = match form.validate() {
        Ok(id) => id,
        Err(e) => {
            warn!("client form rejected: {e:?}");
            store.notifier().notify(Notice::warning("Warning", e.to_string()));
            return None;
        }
    };

    let client_id = match client_id {
        Some(id) => match db::clients::client_exists(store, id) {
            Ok(true) => id,
            Ok(false) => {
                store
                    .notifier()
                    .notify(Notice::info("Information", "Client ID not found."));
                return None;
            }
            Err(e) => {
                store
                    .notifier()
                    .notify(Notice::error("Database Error", e.to_string()));
                return None;
            }
        },
        None => match db::clients::generate_client_id(store, rng) {
            Ok(id) => id,
            Err(e) => {
                store
                    .notifier()
                    .notify(Notice::error("Database Error", e.to_string()));
                return None;
            }
        },
    };

    let outcome = db::clients::save_client(store, &form.into_client(client_id))?;
    info!("client {client_id} saved ({outcome:?})");
    Some(AmendOutcome { client_id, outcome })
}
