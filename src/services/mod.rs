// Services module for the placebook backend
// Business logic layer for share links, tracking, and referral attribution

pub mod friend_link;
pub mod public_code;
pub mod referral_token;
pub mod share_link;
pub mod view_tracking;

// Re-export commonly used services
pub use friend_link::FriendLinkService;
pub use public_code::{generate_public_code, PUBLIC_CODE_LENGTH};
pub use referral_token::{ReferralTokenCipher, ReferralTokenError};
pub use share_link::ShareLinkService;
pub use view_tracking::ViewTrackingService;
