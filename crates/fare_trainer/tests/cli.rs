//! Console behaviour of the `fare-trainer` binary

use std::path::Path;
use std::process::Command;

use anyhow::Result;

fn shipped_train_file() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../Data/Train_trip_data.csv")
}

#[test]
fn test_missing_test_file_fails_after_training() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_fare-trainer"))
        .arg("--train")
        .arg(shipped_train_file())
        .arg("--test")
        .arg("no/such/Test_trip_data.csv")
        .output()?;

    assert!(!output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let train = stdout.find("- Train the Model ...").expect("train line");
    let end = stdout.find("- End of training.").expect("end of training line");
    assert!(train < end);
    assert!(!stdout.contains("- RSquared Score:"));

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Failed to load test data"), "{stderr}");
    Ok(())
}

#[test]
fn test_missing_train_file_fails_before_training() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_fare-trainer"))
        .arg("--train")
        .arg("no/such/Train_trip_data.csv")
        .output()?;

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("- Create the Model."));
    assert!(!stdout.contains("- Train the Model ..."));
    Ok(())
}
