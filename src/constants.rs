// API Constants
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

pub const SYSTEM_INSTRUCTION: &str = "You are Fei, the front-desk assistant for the Hsin-San Cloud Hair Salon. \
Greet customers warmly, answer questions about services, opening hours, stylists and bookings, \
and keep replies short, friendly and practical. If you don't know something, say so and offer \
to take a note for the salon staff instead of guessing.";

pub const WELCOME_TEXT: &str =
    "Hello! I'm Fei, the salon's front-desk assistant. How can I help you today?";

// Fallback bubble text, one per failure category
pub const CREDENTIAL_FAILURE_TEXT: &str =
    "The configured API key was rejected. Please check that GEMINI_API_KEY holds a valid key.";
pub const QUOTA_FAILURE_TEXT: &str =
    "Fei is over capacity right now. Please try again in a little while.";
pub const GENERIC_FAILURE_TEXT: &str =
    "Sorry, something went wrong on my end. Please try sending that again.";

// Setup-time panel text
pub const MISSING_KEY_TEXT: &str =
    "GEMINI_API_KEY is not set.\n\nExport the key (or put it in a .env file) and restart.";
pub const INIT_FAILURE_TEXT: &str =
    "Failed to initialize the chat session. Please restart and try again.";
