//! Terminal rendering for listings, reports and the dashboard.

use rollcall_core::types::display_timestamp;
use rollcall_core::{AttendanceRecord, AttendanceSession, Student, Summary, TrendPoint};

const TREND_BAR_WIDTH: u32 = 40;

pub fn students_table(students: &[&Student]) {
    if students.is_empty() {
        println!("No students found matching your search.");
        return;
    }
    println!("{:<28} {:<12}", "Name", "Roll Number");
    for s in students {
        println!("{:<28} {:<12}", s.name, s.roll_number);
    }
    println!("{} student(s)", students.len());
}

pub fn history_list(sessions: &[AttendanceSession]) {
    if sessions.is_empty() {
        println!("No sessions yet.");
        println!("Start your first class attendance session to see the history here.");
        return;
    }
    println!("{:<38} {:<24} {:>8}", "Session", "Taken", "Present");
    for s in sessions {
        println!(
            "{:<38} {:<24} {:>8}",
            format!("{} ({})", s.subject, s.id),
            display_timestamp(s.created_at),
            s.record_count
        );
    }
}

pub fn session_heading(records: &[AttendanceRecord], present: usize, absent: usize) {
    // Subject and timestamp come off the first record, the way the
    // backend shapes session-detail responses.
    let subject = records
        .first()
        .and_then(|r| r.session_subject.clone())
        .unwrap_or_else(|| "Class".to_string());
    let taken = records.first().and_then(|r| r.created_at);

    println!("Session Report: {subject}");
    let taken = display_timestamp(taken);
    if !taken.is_empty() {
        println!("Taken: {taken}");
    }
    println!("Present: {present}   Absent: {absent}");
    println!();
}

pub fn present_list(records: &[&AttendanceRecord]) {
    if records.is_empty() {
        println!("No students found");
        return;
    }
    for r in records {
        println!(
            "{:<28} {:<12} present  {}",
            r.student_name(),
            r.student_roll(),
            display_timestamp(r.created_at)
        );
    }
}

pub fn absent_list(students: &[&Student]) {
    if students.is_empty() {
        println!("No students found");
        return;
    }
    for s in students {
        println!("{:<28} {:<12} absent", s.name, s.roll_number);
    }
}

pub fn dashboard(
    email: &str,
    summary: Summary,
    total_students: usize,
    trend: &[TrendPoint],
    recent: &[AttendanceSession],
) {
    println!("Dashboard for {email}");
    println!();
    println!("  Total Sessions : {}", summary.total_sessions);
    println!("  Total Students : {total_students}");
    println!("  Avg Class Size : {}", summary.average_class_size);
    println!();

    println!("Attendance Trend");
    if trend.is_empty() {
        println!("  No data available");
    } else {
        // Trailing window: the most recent dates
        let window = &trend[trend.len().saturating_sub(5)..];
        let peak = window.iter().map(|p| p.total_present).max().unwrap_or(0);
        for point in window {
            let bar = match peak {
                0 => 0,
                _ => point.total_present * TREND_BAR_WIDTH / peak,
            };
            println!(
                "  {:<8} {:>4}  {}",
                point.label(),
                point.total_present,
                "#".repeat(bar as usize)
            );
        }
    }
    println!();

    println!("Recent Sessions");
    if recent.is_empty() {
        println!("  No recent sessions");
    } else {
        for s in recent {
            println!(
                "  {:<24} {:<24} {:>4} present",
                s.subject,
                display_timestamp(s.created_at),
                s.record_count
            );
        }
    }
}
