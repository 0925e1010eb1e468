use std::sync::atomic::{AtomicUsize, Ordering};

use clap::CommandFactory;

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("bc_report_main_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["bc-report", "-p", "base", "job"]).unwrap();
    assert_eq!(cli.pipeline, "base");
    assert_eq!(cli.job_dir, PathBuf::from("job"));
    assert_eq!(cli.out_dir, PathBuf::from("./output"));
    assert_eq!(cli.verbose, 0);
    assert!(!cli.force);
    assert!(!cli.log_time);
    assert!(!cli.no_color);
    assert!(cli.static_dir.is_none());
}

#[test]
fn test_cli_help_lists_options() {
    let help = Cli::command().render_help().to_string();
    assert!(help.contains("Registered pipeline name"));
    assert!(help.contains("Extra static folder merged over the bundled assets"));
    assert!(help.contains("--force"));
}

#[test]
fn test_cli_flags() {
    let cli = Cli::try_parse_from([
        "bc-report",
        "-vv",
        "--log-time",
        "--no-color",
        "--static-dir",
        "theme",
        "-f",
        "--pipeline",
        "rna_seq",
        "job",
        "out",
    ])
    .unwrap();
    assert_eq!(cli.verbose, 2);
    assert!(cli.force);
    assert!(cli.log_time);
    assert!(cli.no_color);
    assert_eq!(cli.pipeline, "rna_seq");
    assert_eq!(cli.out_dir, PathBuf::from("out"));
    assert_eq!(cli.static_dir, Some(PathBuf::from("theme")));
}

#[test]
fn test_cli_requires_pipeline() {
    assert!(Cli::try_parse_from(["bc-report", "job"]).is_err());
}

#[test]
fn test_prepare_output_dir_creates_missing() {
    let dir = make_temp_dir();
    let out = dir.join("nested").join("output");
    prepare_output_dir(&out, false).unwrap();
    assert!(out.is_dir());
}

#[test]
fn test_prepare_output_dir_refuses_existing_without_force() {
    let dir = make_temp_dir();
    let out = dir.join("output");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.txt"), "x").unwrap();

    let err = prepare_output_dir(&out, false).unwrap_err();
    assert!(matches!(err, ReportError::Filesystem { .. }));
    assert!(err.to_string().contains("--force"));
    assert!(out.join("keep.txt").exists());
}

#[test]
fn test_prepare_output_dir_force_replaces_existing() {
    let dir = make_temp_dir();
    let out = dir.join("output");
    fs::create_dir_all(out.join("report")).unwrap();
    fs::write(out.join("stale.txt"), "x").unwrap();

    prepare_output_dir(&out, true).unwrap();
    assert!(out.is_dir());
    assert!(!out.join("stale.txt").exists());
    assert!(!out.join("report").exists());
}

#[test]
fn test_run_rejects_missing_job_dir() {
    let dir = make_temp_dir();
    let cli = Cli::try_parse_from([
        "bc-report".to_string(),
        "-p".to_string(),
        "base".to_string(),
        dir.join("absent").display().to_string(),
        dir.join("out").display().to_string(),
    ])
    .unwrap();
    let err = run(&cli).unwrap_err();
    assert!(matches!(err, ReportError::Configuration(_)));
    assert!(!dir.join("out").exists());
}

#[test]
fn test_run_rejects_unknown_pipeline_before_touching_output() {
    let dir = make_temp_dir();
    let cli = Cli::try_parse_from([
        "bc-report".to_string(),
        "-p".to_string(),
        "chip_seq".to_string(),
        dir.display().to_string(),
        dir.join("out").display().to_string(),
    ])
    .unwrap();
    let err = run(&cli).unwrap_err();
    assert!(err.to_string().contains("chip_seq"));
    assert!(!dir.join("out").exists());
}

#[test]
fn test_caveat_message_points_at_output() {
    let msg = caveat_message(Path::new("./output"));
    assert!(msg.starts_with("New output result is under ./output."));
    assert!(msg.contains("python3 -m http.server"));
}

#[test]
fn test_run_base_pipeline_with_static_override() {
    let dir = make_temp_dir();
    let job = dir.join("job");
    fs::create_dir_all(job.join("01_fastqc")).unwrap();
    fs::write(
        job.join("analysis_info.yaml"),
        "data_sources: []\nconditions:\n  - control:\n      - s1: {}\n",
    )
    .unwrap();
    let theme = dir.join("theme");
    fs::create_dir_all(theme.join("css")).unwrap();
    fs::write(theme.join("css/site.css"), "/* theme */").unwrap();
    let out = dir.join("out");
    fs::create_dir_all(&out).unwrap();

    let args = [
        "bc-report".to_string(),
        "-f".to_string(),
        "-p".to_string(),
        "base".to_string(),
        "--static-dir".to_string(),
        theme.display().to_string(),
        job.display().to_string(),
        out.display().to_string(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();
    run(&cli).unwrap();

    let report_root = out.join("report");
    assert!(report_root.join("index.html").is_file());
    assert!(report_root.join("fastqc.html").is_file());
    assert_eq!(
        fs::read_to_string(report_root.join("static/css/site.css")).unwrap(),
        "/* theme */"
    );
    assert!(report_root.join("static/js/charts.js").is_file());
}
