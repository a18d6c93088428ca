use std::io;

use modulith::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::TemplateNotFoundError("package/domain/Entity.java.j2".to_string());
    assert_eq!(err.to_string(), "Template 'package/domain/Entity.java.j2' does not exist.");
}

#[test]
fn test_module_conflict_display() {
    let err = Error::ModuleConflictError {
        entity: "Invoice".to_string(),
        other_entity: "Customer".to_string(),
        module: "billing".to_string(),
        other_module: "crm".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Cannot relate entity Invoice to entity Customer. they belong to different modules ('billing' and 'crm')."
    );
}
