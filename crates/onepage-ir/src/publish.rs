//! Atomic publish and validated load of IR files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::IrResult;
use crate::schema::IntermediateRepresentation;

/// Write `ir` to `path` atomically.
///
/// The IR is validated and serialized first. The bytes go to a temporary
/// file in the target directory, which is synced and then renamed over
/// `path`. A failure at any step leaves an existing file at `path`
/// untouched.
pub fn publish(ir: &IntermediateRepresentation, path: &Path) -> IrResult<()> {
    ir.validate()?;
    let mut json = ir.to_json_pretty()?;
    json.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(path = %path.display(), bytes = json.len(), "IR published");
    Ok(())
}

/// Read and validate an IR file.
pub fn load(path: &Path) -> IrResult<IntermediateRepresentation> {
    let json = std::fs::read_to_string(path)?;
    let ir = IntermediateRepresentation::from_json(&json)?;
    ir.validate()?;
    Ok(ir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::tests::sample_ir;
    use crate::error::{InvariantViolation, IrError};

    #[test]
    fn publish_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Q1058.json");
        let ir = sample_ir();
        publish(&ir, &path).unwrap();
        assert_eq!(load(&path).unwrap(), ir);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn republishing_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ir.json");
        publish(&sample_ir(), &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        publish(&sample_ir(), &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn invalid_ir_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ir.json");
        std::fs::write(&path, "previous").unwrap();
        let mut ir = sample_ir();
        ir.references.clear();
        let err = publish(&ir, &path).unwrap_err();
        assert!(matches!(err, IrError::Invariant(InvariantViolation::DanglingReference { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }

    #[test]
    fn load_rejects_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ir.json");
        let mut ir = sample_ir();
        ir.sections.clear();
        std::fs::write(&path, serde_json::to_string(&ir).unwrap()).unwrap();
        assert!(matches!(load(&path), Err(IrError::Invariant(_))));
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(IrError::Json(_))));
    }
}
