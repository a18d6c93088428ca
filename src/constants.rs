//! Common constants used throughout modulith.

/// Project configuration record, at the project root.
pub const PROJECT_CONFIG_FILE: &str = ".modulith.json";

/// Directory holding one `<Entity>.json` record per generated entity.
pub const ENTITY_CONFIG_DIR: &str = ".modulith";

pub const SERVER_MAIN_SRC_DIR: &str = "src/main/java/";
pub const SERVER_MAIN_RES_DIR: &str = "src/main/resources/";
pub const SERVER_TEST_SRC_DIR: &str = "src/test/java/";
pub const TEST_DIR: &str = "src/test/";

/// Suffix marking a template that must be rendered rather than copied.
pub const TEMPLATE_SUFFIX: &str = ".j2";

pub const LIQUIBASE_MASTER_FILE: &str = "config/liquibase/master.xml";
pub const LIQUIBASE_CHANGELOG_NEEDLE: &str = "modulith-needle-liquibase-add-changelog";
pub const LIQUIBASE_CONSTRAINTS_NEEDLE: &str =
    "modulith-needle-liquibase-add-constraints-changelog";
pub const CACHE_NEEDLE: &str = "modulith-needle-hibernate-cache-add-entry";

/// Entity handled by the application itself; relationships to it never
/// conflict across modules.
pub const USER_ENTITY: &str = "User";
