/// Key under which the "has played" flag is persisted.
pub const PLAYED_FLAG_KEY: &str = "spin-wheel-played";

pub const SPIN_DURATION_MS: u64 = 4000; // Duration of spin animation in milliseconds
pub const MIN_SPINS: u32 = 5; // Full rotations before the wheel settles
pub const FULL_TURN_DEGREES: f64 = 360.0;

// Policy B turns a win ratio into an integer selection weight on this scale
pub const RATIO_WEIGHT_SCALE: f64 = 1000.0;

// Defaults matching the stock promotional wheel
pub const DEFAULT_TOTAL_PLAYERS: u32 = 30;
pub const DEFAULT_TOTAL_WINNERS: u32 = 2;
pub const DEFAULT_WHEEL_SLICES: usize = 6;
pub const DEFAULT_WINNING_SLICES: [usize; 2] = [1, 4];

pub const WINNING_SLICE_COLOR: &str = "bg-green-600";
pub const LOSING_SLICE_COLORS: [&str; 4] = ["bg-red-800", "bg-blue-800", "bg-yellow-700", "bg-orange-700"];
pub const WINNING_SLICE_ICON: &str = "gift";
pub const LOSING_SLICE_ICON: &str = "star";

pub const INVALID_EMAIL_ERROR: &str = "Please enter a valid email address";
pub const INVALID_PHONE_ERROR: &str = "Please enter a valid phone number";
pub const INVALID_LOCAL_PHONE_ERROR: &str = "Please enter a valid mobile number starting with 07";

pub const ALREADY_PLAYED_MESSAGE: &str = "You've already played!";
pub const WIN_MESSAGE: &str = "You won a fantastic prize!";
pub const LOSE_MESSAGE: &str = "Thanks for playing! Come back tomorrow for another chance!";
