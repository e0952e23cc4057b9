use futures::stream::BoxStream;
use utility::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Restricted,
    Denied,
    NotDetermined,
    Authorized,
}

impl Authorization {
    pub fn is_granted(self) -> bool {
        self == Authorization::Authorized
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationEvent {
    AuthorizationChanged(Authorization),
    Fix(Coordinate),
}

/// Device location source, owned by the platform layer.
pub trait LocationProvider: Send + Sync + 'static {
    /// Push stream of authorization changes and fixes from now on. Dropping
    /// the stream unsubscribes.
    fn events(&self) -> BoxStream<'static, LocationEvent>;

    fn authorization(&self) -> Authorization;

    /// Most recent fix the provider already knows about, if any.
    fn last_known(&self) -> Option<Coordinate>;

    fn request_authorization(&self);

    fn start_updating(&self);

    fn stop_updating(&self) {}
}
