//! Request messages understood by a [`ResourceActor`](crate::framework::ResourceActor).

use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use tokio::sync::{oneshot, watch};

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// # Resource-Oriented Architecture
/// Records are never removed, so the vocabulary is create, read and update, plus `List`
/// for history screens and `Subscribe` for push notification of changes.
///
/// - **Create**: uses [`ActorEntity::Create`] to initialize a new record.
/// - **Get**: fetches the current state of the record by ID.
/// - **List**: returns a snapshot of every stored record.
/// - **Update**: uses [`ActorEntity::Update`] to mutate an existing record.
/// - **Subscribe**: returns a `watch` receiver that observes every successful write.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Subscribe {
        id: T::Id,
        respond_to: Response<watch::Receiver<T>>,
    },
}
