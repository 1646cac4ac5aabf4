use stackparse::aggregator::SortKey;
use stackparse::commands::{execute_inspect, validate_args, InputSource, InspectArgs, OutputMode};
use stackparse::filter::Filter;
use stackparse::parser::{parse_flag_duration, LinePrefix};
use stackparse::utils::{ArgumentError, InputError, ParseError};
use std::io::Write;
use tempfile::NamedTempFile;

const DUMP: &str = include_str!("data/goroutines.txt");

fn dump_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run(args: &InspectArgs) -> anyhow::Result<String> {
    let mut out = Vec::new();
    execute_inspect(args, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_full_output_sorted_by_wait() {
    let file = dump_file(DUMP);
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        ..Default::default()
    };

    let text = run(&args).unwrap();
    let headers: Vec<&str> = text.lines().filter(|l| l.starts_with("goroutine ")).collect();
    assert_eq!(
        headers,
        vec![
            "goroutine 7 [IO wait]:",
            "goroutine 18 [select, 3 minutes]:",
            "goroutine 22 [select, 3 minutes]:",
            "goroutine 34 [syscall, 9 minutes, locked to thread]:",
            "goroutine 1 [chan receive, 12 minutes]:",
        ]
    );
    assert!(text.contains("...additional frames elided...\n"));
    assert!(!text.contains("SIGQUIT"));
}

#[test]
fn test_summary_output() {
    let file = dump_file(DUMP);
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        filters: vec![Filter::WaitGreaterThan(parse_flag_duration("1m").unwrap())],
        output: OutputMode::Summary,
        ..Default::default()
    };

    let text = run(&args).unwrap();
    assert_eq!(
        text,
        "\
syscall.Syscall6                   1
main.main                          1
net/http.(*persistConn).writeLoop  2
"
    );
}

#[test]
fn test_json_output() {
    let file = dump_file(DUMP);
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        sort: SortKey::GoroutineId,
        output: OutputMode::Json,
        ..Default::default()
    };

    let text = run(&args).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["total_stacks"], 5);
    let ids: Vec<u64> = json["stacks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 7, 18, 22, 34]);
}

#[test]
fn test_empty_dump_prints_nothing() {
    let file = dump_file("");
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        ..Default::default()
    };

    assert_eq!(run(&args).unwrap(), "");
}

#[test]
fn test_line_prefix_option() {
    let prefixed: String = DUMP
        .lines()
        .map(|line| format!("app | {}\n", line))
        .collect();
    let file = dump_file(&prefixed);
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        line_prefix: Some(LinePrefix::new(r"app \| ").unwrap()),
        output: OutputMode::Summary,
        ..Default::default()
    };

    let text = run(&args).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_parse_error_is_fatal() {
    let file = dump_file(&format!("{}\ngoroutine abc [running]:\nmain.f()\n\t/f.go:1\n", DUMP));
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        ..Default::default()
    };

    let err = run(&args).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::InvalidGoroutineId { .. })
    ));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let args = InspectArgs {
        input: InputSource::File(dir.path().join("missing.txt")),
        ..Default::default()
    };

    let err = run(&args).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::Open { .. })
    ));
}

#[test]
fn test_input_source_from_arg() {
    assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
    assert_eq!(
        InputSource::from_arg("dump.txt"),
        InputSource::File("dump.txt".into())
    );
}

#[test]
fn test_output_mode_values() {
    assert_eq!("full".parse::<OutputMode>().unwrap(), OutputMode::Full);
    assert_eq!("summary".parse::<OutputMode>().unwrap(), OutputMode::Summary);
    assert_eq!("json".parse::<OutputMode>().unwrap(), OutputMode::Json);
    assert!(matches!(
        "top".parse::<OutputMode>(),
        Err(ArgumentError::UnimplementedOutputMode(_))
    ));
    assert!(matches!(
        "table".parse::<OutputMode>(),
        Err(ArgumentError::UnknownOutputMode(_))
    ));
}

#[test]
fn test_validate_args_rejects_empty_path() {
    let args = InspectArgs {
        input: InputSource::File("".into()),
        ..Default::default()
    };

    assert!(matches!(
        validate_args(&args),
        Err(ArgumentError::EmptyInputPath)
    ));
}

#[test]
fn test_bad_line_prefix_is_an_argument_error() {
    assert!(matches!(
        LinePrefix::new("["),
        Err(ArgumentError::InvalidLinePrefix { .. })
    ));
}

#[test]
fn test_repeated_wait_filters_combine() {
    let file = dump_file(DUMP);
    let args = InspectArgs {
        input: InputSource::File(file.path().to_path_buf()),
        filters: vec![
            Filter::WaitGreaterThan(parse_flag_duration("1m").unwrap()),
            Filter::WaitGreaterThan(parse_flag_duration("5m").unwrap()),
            Filter::WaitGreaterThan(parse_flag_duration("10m").unwrap()).negate(),
        ],
        ..Default::default()
    };

    let text = run(&args).unwrap();
    let headers: Vec<&str> = text.lines().filter(|l| l.starts_with("goroutine ")).collect();
    assert_eq!(headers, vec!["goroutine 34 [syscall, 9 minutes, locked to thread]:"]);
}
