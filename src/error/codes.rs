/// Error code registry for the provisioner
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Authentication and site errors
/// - 3000-3999: Template errors
/// - 4000-4999: Engine and subprocess errors
/// - 5000-5999: Input and substitution errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1003;
    pub const CONFIG_INVALID_VALUE: u16 = 1004;

    // Authentication and site errors (2000-2999)
    pub const SITE_GENERIC: u16 = 2000;
    pub const SITE_AUTH_FAILED: u16 = 2001;
    pub const SITE_REALM_NOT_FOUND: u16 = 2002;
    pub const SITE_REQUEST_FAILED: u16 = 2003;
    pub const SITE_INVALID_RESPONSE: u16 = 2004;
    pub const SITE_LIST_NOT_FOUND: u16 = 2005;

    // Template errors (3000-3999)
    pub const TEMPLATE_NOT_FOUND: u16 = 3001;
    pub const TEMPLATE_PARSE_ERROR: u16 = 3002;
    pub const TEMPLATE_IO_ERROR: u16 = 3003;

    // Engine and subprocess errors (4000-4999)
    pub const ENGINE_GENERIC: u16 = 4000;
    pub const ENGINE_COMMAND_NOT_FOUND: u16 = 4001;
    pub const ENGINE_TIMEOUT: u16 = 4002;
    pub const ENGINE_FAILED: u16 = 4003;
    pub const ENGINE_SIGNAL_RECEIVED: u16 = 4004;
    pub const ENGINE_SPAWN_FAILED: u16 = 4005;

    // Input and substitution errors (5000-5999)
    pub const INPUT_INVALID_MESSAGE: u16 = 5001;
    pub const INPUT_MISSING_SITE_URL: u16 = 5002;
    pub const INPUT_INVALID_DATE: u16 = 5003;
}
