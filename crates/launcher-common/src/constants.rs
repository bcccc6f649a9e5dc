//! System-wide constants, literal markers, and default paths.

/// Joins the contents of a multi-file environment value.
pub const FILE_SEPARATOR: &str = "_FILE_SEPERATOR_";

/// Boot command used when no layer sets one.
pub const DEFAULT_BOOT_COMMAND: &str = "/sbin/boot";

/// Default directory holding root configuration documents.
pub const DEFAULT_CONF_DIR: &str = "./containers";

/// Default project directory that template references are relative to.
pub const DEFAULT_TEMPLATES_DIR: &str = ".";

/// Default image namespace for built images.
pub const DEFAULT_NAMESPACE: &str = "local_discourse";

/// Default image tag for built images.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Extensions tried, in order, when locating a root document.
pub const CONFIG_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// File name the payload is exported under inside a build directory.
pub const PAYLOAD_FILE_NAME: &str = "config.yaml";

/// In-image path the build recipe materializes the payload at.
pub const IMAGE_PAYLOAD_PATH: &str = "/temp-config.yaml";

/// Path of the initialization tool inside the image.
pub const PUPS_PATH: &str = "/usr/local/bin/pups";

/// Shared-memory sizing flag passed to every build and run.
pub const SHM_SIZE_FLAG: &str = "--shm-size=512m";

/// Environment key that enables the configured hostname.
pub const USE_HOSTNAME_KEY: &str = "DOCKER_USE_HOSTNAME";

/// Environment key holding the configured hostname.
pub const HOSTNAME_KEY: &str = "DISCOURSE_HOSTNAME";

/// Exit code a failed run uses to request a retry.
pub const RETRY_EXIT_CODE: i32 = 77;

/// Environment keys never passed to image builds.
pub const KNOWN_SECRETS: [&str; 7] = [
    "DISCOURSE_DB_PASSWORD",
    "DISCOURSE_DB_REPLICA_PASSWORD",
    "DISCOURSE_REDIS_PASSWORD",
    "DISCOURSE_REDIS_REPLICA_PASSWORD",
    "DISCOURSE_SMTP_PASSWORD",
    "DISCOURSE_SECRET_KEY_BASE",
    "DISCOURSE_MAXMIND_LICENSE_KEY",
];

/// Application name used in CLI output.
pub const APP_NAME: &str = "launcher";
