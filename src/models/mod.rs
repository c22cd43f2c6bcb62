pub mod friendship;
pub mod place;
pub mod share_link;
pub mod user;
pub mod view_event;

// Re-export common types
pub use friendship::{Friendship, FriendshipStatus, NewFriendship};
pub use place::Place;
pub use share_link::{
    ConnectFriendRequest, ConnectFriendResponse, CreateShareRequest, NewShareLink,
    PublicPlaceView, ShareLink, ShareLinkResponse, ShareStat, SharerInfo, TrackViewRequest,
};
pub use user::User;
pub use view_event::{NewViewEvent, ViewEvent};
