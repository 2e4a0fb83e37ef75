/*!
 * Integration tests for the search and adjustment workflows
 */

use anyhow::Result;
use std::fs;
use smisync::encoding::{EncodingDetector, TextEncoding};
use smisync::{AdjustmentRule, Controller, OperationOutcome, SubtitleOccurrence, SyncError, TimestampRewriter};
use crate::common;

/// Batch adjustment on a UTF-8 file changes only the sync digits
#[test]
fn test_batch_adjust_withUtf8File_shouldShiftAndPreserveBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", common::SAMPLE_SMI.as_bytes())?;
    let destination = temp_dir.path().join("movie.synced.smi");

    let controller = Controller::new_for_test()?;
    let summary = controller.batch_adjust(&source, &destination, "1.5")?;

    assert_eq!(summary.offset_ms, 1500);
    assert_eq!(summary.encoding, TextEncoding::Utf8 { bom: false });
    assert_eq!(summary.report.adjusted, 4);
    assert!(!summary.in_place);

    let output = fs::read_to_string(&destination)?;
    assert!(output.contains("<SYNC Start=2500><P Class=KRCC>안녕하세요\r\n"));
    assert!(output.contains("<sync start=8750><p class=krcc>Hello 5000 world\r\n"));
    assert_eq!(common::sync_times(&output), vec![2500, 5000, 6500, 8750]);
    assert_eq!(common::mask_sync_digits(&output), common::mask_sync_digits(common::SAMPLE_SMI));

    // Source is untouched
    assert_eq!(fs::read_to_string(&source)?, common::SAMPLE_SMI);
    Ok(())
}

/// Anchor adjustment moves the anchor line to the target time
#[test]
fn test_anchor_adjust_withTargetBeforeAnchor_shouldShiftAllAndClamp() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", common::SAMPLE_SMI.as_bytes())?;
    let destination = temp_dir.path().join("anchored.smi");

    let controller = Controller::new_for_test()?;
    let summary = controller.anchor_adjust(&source, &destination, 5000, "3.0")?;

    assert_eq!(summary.offset_ms, -2000);
    assert_eq!(summary.report.clamped, 1);

    let output = fs::read_to_string(&destination)?;
    assert_eq!(common::sync_times(&output), vec![0, 1500, 3000, 5250]);
    Ok(())
}

/// A UTF-16 file is written back as UTF-16 with the same byte-order mark
#[test]
fn test_batch_adjust_withUtf16File_shouldKeepEncoding() -> Result<()> {
    for encoding in [
        TextEncoding::Utf16 { big_endian: false, bom: true },
        TextEncoding::Utf16 { big_endian: true, bom: true },
    ] {
        let temp_dir = common::create_temp_dir()?;
        let bytes = EncodingDetector::encode(common::SAMPLE_SMI, encoding)?;
        let source = common::create_test_file(temp_dir.path(), "movie.smi", &bytes)?;
        let destination = temp_dir.path().join("out.smi");

        let controller = Controller::new_for_test()?;
        let summary = controller.batch_adjust(&source, &destination, "-0.5")?;
        assert_eq!(summary.encoding, encoding);

        let expected = EncodingDetector::encode(&TimestampRewriter::rewrite(common::SAMPLE_SMI, -500), encoding)?;
        assert_eq!(fs::read(&destination)?, expected);
    }
    Ok(())
}

/// A CP949 file is written back as CP949
#[test]
fn test_batch_adjust_withCp949File_shouldKeepEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let bytes = EncodingDetector::encode(common::SAMPLE_SMI, TextEncoding::Cp949)?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", &bytes)?;
    let destination = temp_dir.path().join("out.smi");

    let controller = Controller::new_for_test()?;
    let summary = controller.batch_adjust(&source, &destination, "10")?;
    assert_eq!(summary.encoding, TextEncoding::Cp949);

    let expected = EncodingDetector::encode(&TimestampRewriter::rewrite(common::SAMPLE_SMI, 10_000), TextEncoding::Cp949)?;
    assert_eq!(fs::read(&destination)?, expected);
    Ok(())
}

/// A UTF-8 byte-order mark survives the round trip, and its absence too
#[test]
fn test_batch_adjust_withUtf8Bom_shouldKeepBom() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"<SYNC Start=1000><P Class=KRCC>Hi\n");
    let source = common::create_test_file(temp_dir.path(), "movie.smi", &bytes)?;
    let destination = temp_dir.path().join("out.smi");

    let controller = Controller::new_for_test()?;
    controller.batch_adjust(&source, &destination, "1")?;

    assert_eq!(fs::read(&destination)?, b"\xEF\xBB\xBF<SYNC Start=2000><P Class=KRCC>Hi\n");
    Ok(())
}

/// Search works on a CP949 file
#[test]
fn test_search_withCp949File_shouldFindKoreanText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let bytes = EncodingDetector::encode(common::SAMPLE_SMI, TextEncoding::Cp949)?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", &bytes)?;

    let controller = Controller::new_for_test()?;
    let results = controller.search(&source, "안녕")?;

    assert_eq!(results, vec![SubtitleOccurrence { ms: 1000, text: "안녕하세요".to_string() }]);
    Ok(())
}

/// An empty query returns nothing, even for a file that does not exist
#[test]
fn test_search_withEmptyQuery_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;
    assert!(controller.search(temp_dir.path().join("missing.smi"), "")?.is_empty());
    Ok(())
}

/// Search reports a missing file
#[test]
fn test_search_withMissingFile_shouldFailWithFileNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;
    let result = controller.search(temp_dir.path().join("missing.smi"), "Hello");
    assert!(matches!(result, Err(SyncError::FileNotFound(_))));
    Ok(())
}

/// An undecodable file fails and no output is created
#[test]
fn test_batch_adjust_withUndecodableFile_shouldNotCreateOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "broken.smi", b"\x80\x80<SYNC Start=1000>")?;
    let destination = temp_dir.path().join("out.smi");

    let controller = Controller::new_for_test()?;
    let result = controller.batch_adjust(&source, &destination, "1");

    assert!(matches!(result, Err(SyncError::EncodingUnsupported { .. })));
    assert!(!destination.exists());
    Ok(())
}

/// An undecodable file leaves an existing destination untouched
#[test]
fn test_anchor_adjust_withUndecodableFile_shouldNotModifyExistingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "broken.smi", b"\xFF\x80")?;
    let destination = common::create_test_file(temp_dir.path(), "out.smi", b"keep me")?;

    let controller = Controller::new_for_test()?;
    let result = controller.anchor_adjust(&source, &destination, 1000, "2");

    assert!(matches!(result, Err(SyncError::EncodingUnsupported { .. })));
    assert_eq!(fs::read(&destination)?, b"keep me");
    Ok(())
}

/// A bad offset fails before anything is written
#[test]
fn test_batch_adjust_withInvalidOffset_shouldFailWithInvalidNumber() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", common::SAMPLE_SMI.as_bytes())?;
    let destination = temp_dir.path().join("out.smi");

    let controller = Controller::new_for_test()?;
    let result = controller.batch_adjust(&source, &destination, "one second");

    assert!(matches!(result, Err(SyncError::InvalidNumber(_))));
    assert!(!destination.exists());
    Ok(())
}

/// Adjusting a file onto itself works because it is fully read first
#[test]
fn test_batch_adjust_withSameSourceAndDestination_shouldRewriteInPlace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", common::SAMPLE_SMI.as_bytes())?;

    let controller = Controller::new_for_test()?;
    let summary = controller.batch_adjust(&source, &source, "2")?;
    assert!(summary.in_place);
    assert!(summary.to_string().contains("in place"));

    let output = fs::read_to_string(&source)?;
    assert_eq!(common::sync_times(&output), vec![3000, 5500, 7000, 9250]);
    assert_eq!(common::mask_sync_digits(&output), common::mask_sync_digits(common::SAMPLE_SMI));
    Ok(())
}

/// The generic adjust entry point accepts either rule
#[test]
fn test_adjust_withRules_shouldMatchDedicatedOperations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", common::SAMPLE_SMI.as_bytes())?;
    let controller = Controller::new_for_test()?;

    let rule = AdjustmentRule::AnchorOffset { original_ms: 7250, target_seconds: "7.5".to_string() };
    let summary = controller.adjust(&source, temp_dir.path().join("a.smi"), &rule)?;
    assert_eq!(summary.offset_ms, 250);

    let dedicated = controller.anchor_adjust(&source, temp_dir.path().join("b.smi"), 7250, "7.5")?;
    assert_eq!(fs::read(temp_dir.path().join("a.smi"))?, fs::read(temp_dir.path().join("b.smi"))?);
    assert_eq!(dedicated.offset_ms, summary.offset_ms);
    Ok(())
}

/// The default destination sits next to the input with the configured suffix
#[test]
fn test_default_destination_withDefaultConfig_shouldUseSuffix() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let destination = controller.default_destination("/subs/movie.smi");
    assert_eq!(destination, std::path::Path::new("/subs/movie.synced.smi"));
    Ok(())
}

/// Operation outcomes carry a success flag and a readable message
#[test]
fn test_operation_outcome_withResults_shouldReportFlagAndMessage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "movie.smi", common::SAMPLE_SMI.as_bytes())?;
    let controller = Controller::new_for_test()?;

    let ok = controller.batch_adjust(&source, temp_dir.path().join("out.smi"), "1");
    let outcome = OperationOutcome::from_result(&ok);
    assert!(outcome.success);
    assert!(outcome.message.contains("1000 ms"));

    let failed = controller.batch_adjust(temp_dir.path().join("missing.smi"), temp_dir.path().join("x.smi"), "1");
    let outcome = OperationOutcome::from_result(&failed);
    assert!(!outcome.success);
    assert!(outcome.message.contains("File not found"));
    Ok(())
}
