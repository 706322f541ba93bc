//! Lexio Core Library
//!
//! Client-side content cache and realtime synchronization for the
//! Lexio CMS. Serves translations, colors, images and data-store
//! records from a local cache that keeps itself up to date through
//! push invalidations and periodic polling.

pub mod api;
pub mod cache;
pub mod realtime;
pub mod remote;
pub mod sync;

pub use api::{
    CallbackHandler, HandlerId, Lexio, LexioConfig, LexioError, LexioResult, ResourceChanged,
    ResourceUpdate, UpdateDispatcher, UpdateHandler, UpdatePayload,
};
pub use cache::{
    CacheError, CacheSnapshot, ContentStore, Credentials, EntryMap, FieldValue, Persistence,
    StoreRecord, NEUTRAL_LANG,
};
pub use realtime::{
    mock_channel, ChannelError, ChannelFrame, ChannelState, ChannelTransport, MockChannel,
    MockChannelHandle, TransportEvent,
};
pub use remote::{
    is_valid_hex_color, AuthResponse, BearerSigner, Gateway, GatewayError, RequestSigner,
    ResourcePayload, Session,
};
pub use sync::{
    clamp_poll_interval, Resource, COLORS_ID, IMAGES_ID, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL,
    WILDCARD_ID,
};
