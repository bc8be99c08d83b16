//! Command handlers: thin glue between the API client, the capture
//! controller and the reconciliation engine.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use rollcall_api::{ApiClient, Attachment, SessionStore, StoredSession};
use rollcall_capture::{CameraDevice, CameraSource, CaptureController};
use rollcall_core::{
    bucket_by_date, compute_summary, export_session_csv, filter_matching, partition_attendance,
    recent_sessions, AttendanceRecord, Student,
};

use crate::config::Config;
use crate::render;

pub async fn signup(config: &Config, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let client = ApiClient::new(config.api_url.clone());
    let teacher = client.signup(email, &password).await?;
    println!("Account created for {}. Please log in.", teacher.email);
    Ok(())
}

pub async fn login(config: &Config, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let client = ApiClient::new(config.api_url.clone());
    let session = client.login(email, &password).await?;
    store()?.save(&session)?;
    println!("Welcome back, {}!", session.user.email);
    Ok(())
}

pub fn logout() -> Result<()> {
    store()?.clear()?;
    println!("Logged out successfully");
    Ok(())
}

pub fn whoami() -> Result<()> {
    match store()?.load() {
        Some(session) => println!("{} ({})", session.user.email, session.user.id),
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn students(config: &Config, query: &str) -> Result<()> {
    let (client, _) = signed_in(config)?;
    let roster = client.students().await?;
    let hits = filter_matching(
        &roster,
        query,
        &[
            |s: &Student| s.name.as_str(),
            |s: &Student| s.roll_number.as_str(),
        ],
    );
    render::students_table(&hits);
    Ok(())
}

pub async fn register(
    config: &Config,
    name: &str,
    roll: &str,
    image: Option<&Path>,
    camera: bool,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("please enter the student's name");
    }
    if roll.trim().is_empty() {
        bail!("please enter a roll number");
    }
    let attachment = acquire_image(config, image, camera)?;
    let (client, _) = signed_in(config)?;
    let student_id = client.register_student(name, roll, attachment).await?;
    println!("Student registered successfully (id {student_id})");
    Ok(())
}

pub async fn attend(
    config: &Config,
    subject: &str,
    image: Option<&Path>,
    camera: bool,
) -> Result<()> {
    if subject.trim().is_empty() {
        bail!("please enter a subject");
    }
    // Acquire and validate the photo before touching the network
    let attachment = acquire_image(config, image, camera)?;
    let (client, session) = signed_in(config)?;

    let outcome = client
        .take_attendance(subject, &session.user.id, attachment)
        .await?;
    println!("Attendance marked!");
    println!(
        "  {} students present in {subject} (session {})",
        outcome.present_count, outcome.session_id
    );
    println!("  View the report with: rollcall session {}", outcome.session_id);
    Ok(())
}

pub async fn history(config: &Config) -> Result<()> {
    let (client, session) = signed_in(config)?;
    let sessions = client.history(&session.user.id).await?;
    render::history_list(&sessions);
    Ok(())
}

pub async fn session(config: &Config, id: &str, query: &str, absent: bool) -> Result<()> {
    let (client, _) = signed_in(config)?;
    // Independent datasets, fetched concurrently
    let (records, roster) = tokio::try_join!(client.session_details(id), client.students())?;

    let split = partition_attendance(&roster, &records);
    render::session_heading(&records, split.present.len(), split.absent.len());

    if absent {
        let hits = filter_matching(
            &split.absent,
            query,
            &[
                |s: &Student| s.name.as_str(),
                |s: &Student| s.roll_number.as_str(),
            ],
        );
        render::absent_list(&hits);
    } else {
        let hits = filter_matching(
            &split.present,
            query,
            &[
                |r: &AttendanceRecord| r.student_name(),
                |r: &AttendanceRecord| r.student_roll(),
            ],
        );
        render::present_list(&hits);
    }
    Ok(())
}

pub async fn export(config: &Config, id: &str, out: Option<PathBuf>) -> Result<()> {
    let (client, _) = signed_in(config)?;
    let records = client.session_details(id).await?;
    if records.is_empty() {
        bail!("session {id} has no records to export");
    }

    let csv = export_session_csv(&records);
    let path = out.unwrap_or_else(|| PathBuf::from(format!("attendance_{id}.csv")));
    fs::write(&path, csv).with_context(|| format!("could not write {}", path.display()))?;
    println!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

pub async fn dashboard(config: &Config) -> Result<()> {
    let (client, session) = signed_in(config)?;
    // Roster and history are independent; fetch them in parallel
    let (sessions, roster) = tokio::try_join!(client.history(&session.user.id), client.students())?;

    let summary = compute_summary(&sessions);
    let trend = bucket_by_date(&sessions);
    render::dashboard(
        &session.user.email,
        summary,
        roster.len(),
        &trend,
        recent_sessions(&sessions, 3),
    );
    Ok(())
}

pub fn camera_test(config: &Config, device: Option<String>) -> Result<()> {
    let devices = CameraDevice::list_devices();
    if devices.is_empty() {
        println!("No video capture devices found");
    } else {
        println!("Video capture devices:");
        for d in &devices {
            println!("  {}  {} [{}]", d.path, d.name, d.driver);
        }
    }

    let path = device.unwrap_or_else(|| config.camera_device.clone());
    match CameraDevice::open(&path) {
        Ok(cam) => println!("{}: ready at {}x{}", cam.device_path, cam.width, cam.height),
        Err(err) => println!("{path}: {err}"),
    }
    Ok(())
}

fn store() -> Result<SessionStore> {
    SessionStore::default_location().context("could not determine the user config directory")
}

fn signed_in(config: &Config) -> Result<(ApiClient, StoredSession)> {
    let session = store()?
        .load()
        .context("not signed in; run `rollcall login` first")?;
    let client = ApiClient::new(config.api_url.clone()).with_token(session.access_token.clone());
    Ok((client, session))
}

/// One image payload for a submission, from a file or one camera frame.
/// Size and camera-availability failures surface here, before any
/// network call is made.
fn acquire_image(config: &Config, image: Option<&Path>, camera: bool) -> Result<Attachment> {
    let mut controller = CaptureController::new();
    match image {
        Some(path) => controller.select_file(path)?,
        None if camera => {
            let device = config.camera_device.clone();
            controller.open_camera(move || {
                CameraDevice::open(&device).map(|d| Box::new(d) as Box<dyn CameraSource>)
            })?;
            tracing::info!(device = %config.camera_device, "camera feed open, capturing frame");
            controller.capture()?;
        }
        None => bail!("provide a photo with --image PATH or --camera"),
    }
    let payload = controller
        .take_payload()
        .context("capture produced no image")?;
    Ok(Attachment {
        bytes: payload.bytes,
        file_name: payload.file_name,
        mime_type: payload.mime_type,
    })
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("please enter a password");
    }
    Ok(password)
}
