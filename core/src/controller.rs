use axum::Router;

/// A group of handlers that knows how to register itself on a router.
///
/// Usually implemented by `#[clinica_macros::controller]` rather than by hand.
pub trait Controller {
    /// State shared by every handler of the controller.
    type State: Clone + Send + Sync + 'static;

    fn router() -> Router<Self::State>;
}
