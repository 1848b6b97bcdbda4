//! Application services - Use case implementations

pub mod geolocation;
pub mod map_lifecycle;
pub mod navigator;
pub mod nearby_stops;
pub mod route;
pub mod session;

pub use geolocation::{
    GEOLOCATION_UNAVAILABLE, GEOLOCATION_UNSUPPORTED, GeolocationProvider, LocationState,
};
pub use map_lifecycle::{MapLifecycleManager, MapPhase, MapSettings, USER_LOCATION_LABEL};
pub use navigator::NavigatorService;
pub use nearby_stops::{
    MAX_NEARBY_STOPS, NearbyStopService, STOP_FETCH_FAILED, STOP_SEARCH_RADIUS_METERS,
    StopFetchOutcome,
};
pub use route::{DEFAULT_JITTER_DEGREES, Jitter, RouteInterpolator};
pub use session::{Advisory, AdvisoryKind, NavigatorSession, StopFetchTicket, TOO_MANY_STOPS};
