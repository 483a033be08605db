use assert_cmd::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn write_image(name: &str, words: &[u16]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lc3-vm-{}-{name}.obj", std::process::id()));
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn fails_without_arguments() {
    let mut cmd = Command::cargo_bin("lc3-vm").unwrap();
    cmd.assert().failure().code(2);
}

#[test]
fn fails_on_missing_image() {
    let mut cmd = Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd
        .arg("does-not-exist.obj")
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load image"), "{stderr}");
}

#[test]
fn runs_until_halt() {
    // .ORIG x3000; ADD R0, R0, #5; OUT; HALT
    let image = write_image("halt", &[0x3000, 0x1025, 0xF021, 0xF025]);
    let mut cmd = Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd.arg(&image).assert().success().get_output().clone();
    fs::remove_file(&image).unwrap();
    assert!(output.stdout.starts_with(b"\x05HALT"), "{:?}", output.stdout);
}

#[test]
fn loads_several_images() {
    // .ORIG x3000; LEA R0, #2; PUTS; HALT and the string in a second image at x3003
    let code = write_image("code", &[0x3000, 0xE002, 0xF022, 0xF025]);
    let data = write_image("data", &[0x3003, 0x004F, 0x004B, 0x0000]);
    let mut cmd = Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd
        .arg(&code)
        .arg(&data)
        .assert()
        .success()
        .get_output()
        .clone();
    fs::remove_file(&code).unwrap();
    fs::remove_file(&data).unwrap();
    assert!(output.stdout.starts_with(b"OKHALT"), "{:?}", output.stdout);
}

#[test]
fn fails_on_unimplemented_opcode() {
    // .ORIG x3000; RES
    let image = write_image("res", &[0x3000, 0xD000]);
    let mut cmd = Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd
        .arg(&image)
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    fs::remove_file(&image).unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unimplemented opcode 0b1101"), "{stderr}");
}

#[test]
fn reads_piped_input() {
    // .ORIG x3000; GETC; OUT; HALT
    let image = write_image("getc", &[0x3000, 0xF020, 0xF021, 0xF025]);
    let mut cmd = assert_cmd::Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd
        .arg(&image)
        .write_stdin("x")
        .assert()
        .success()
        .get_output()
        .clone();
    fs::remove_file(&image).unwrap();
    assert!(output.stdout.starts_with(b"xHALT"), "{:?}", output.stdout);
}

#[test]
fn polls_keyboard_status_for_piped_input() {
    // .ORIG x3000; LDI R1, KBSR; BRzp #-2; LDI R0, KBDR; OUT; HALT; KBSR .FILL xFE00; KBDR .FILL xFE02
    let image = write_image(
        "kbsr",
        &[
            0x3000, 0xA204, 0x07FE, 0xA003, 0xF021, 0xF025, 0xFE00, 0xFE02,
        ],
    );
    let mut cmd = assert_cmd::Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd
        .arg(&image)
        .write_stdin("y")
        .assert()
        .success()
        .get_output()
        .clone();
    fs::remove_file(&image).unwrap();
    assert!(output.stdout.starts_with(b"yHALT"), "{:?}", output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Polling keyboard failed"), "{stderr}");
}

#[test]
fn reports_fatal_error_once() {
    // .ORIG x3000; RES
    let image = write_image("res-once", &[0x3000, 0xD000]);
    let mut cmd = Command::cargo_bin("lc3-vm").unwrap();
    let output = cmd.arg(&image).assert().failure().get_output().clone();
    fs::remove_file(&image).unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Unimplemented opcode").count(), 1, "{stderr}");
}
