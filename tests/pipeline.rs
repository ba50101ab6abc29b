//! End-to-end conversion of a small counter testbench.

use std::fs;

use tempfile::tempdir;
use vwf2tikz::{convert_file, render_vwf, ErrorKind, OutputMode, RenderOptions, VwfError};

const COUNTER_VWF: &str = r#"/*
Copyright (C) Example.  Waveform saved by the simulator waveform editor.
*/

HEADER
{
	VERSION = 1;
	TIME_UNIT = ns;
	DATA_OFFSET = 0.0;
	DATA_DURATION = 80.0;
	SIMULATION_TIME = 0.0;
	GRID_PHASE = 0.0;
	GRID_PERIOD = 10.0;
	GRID_DUTY_CYCLE = 50;
}

SIGNAL("clk")
{
	VALUE_TYPE = NINE_LEVEL_BIT;
	SIGNAL_TYPE = SINGLE_BIT;
	WIDTH = 1;
	LSB_INDEX = -1;
	DIRECTION = INPUT;
	PARENT = "";
}

SIGNAL("rst_n")
{
	VALUE_TYPE = NINE_LEVEL_BIT;
	SIGNAL_TYPE = SINGLE_BIT;
	WIDTH = 1;
	LSB_INDEX = -1;
	DIRECTION = INPUT;
	PARENT = "";
}

SIGNAL("count")
{
	VALUE_TYPE = NINE_LEVEL_BIT;
	SIGNAL_TYPE = BUS;
	WIDTH = 2;
	LSB_INDEX = 0;
	DIRECTION = OUTPUT;
	PARENT = "";
}

SIGNAL("count[1]")
{
	VALUE_TYPE = NINE_LEVEL_BIT;
	SIGNAL_TYPE = SINGLE_BIT;
	WIDTH = 1;
	LSB_INDEX = -1;
	DIRECTION = OUTPUT;
	PARENT = "count";
}

SIGNAL("count[0]")
{
	VALUE_TYPE = NINE_LEVEL_BIT;
	SIGNAL_TYPE = SINGLE_BIT;
	WIDTH = 1;
	LSB_INDEX = -1;
	DIRECTION = OUTPUT;
	PARENT = "count";
}

TRANSITION_LIST("clk")
{
	NODE
	{
		REPEAT = 1;
		NODE
		{
			REPEAT = 4;
			LEVEL 0 FOR 10.0;
			LEVEL 1 FOR 10.0;
		}
	}
}

TRANSITION_LIST("rst_n")
{
	NODE
	{
		REPEAT = 1;
		LEVEL 1 FOR 15.0;
		LEVEL 0 FOR 65.0;
	}
}

TRANSITION_LIST("count[1]")
{
	NODE
	{
		REPEAT = 1;
		LEVEL X FOR 20.0;
		LEVEL 0 FOR 40.0;
		LEVEL 1 FOR 20.0;
	}
}

TRANSITION_LIST("count[0]")
{
	NODE
	{
		REPEAT = 1;
		LEVEL X FOR 20.0;
		LEVEL 0 FOR 20.0;
		LEVEL 1 FOR 20.0;
		LEVEL 0 FOR 20.0;
	}
}

DISPLAY_LINE
{
	CHANNEL = "clk";
	EXPAND_STATUS = COLLAPSED;
	RADIX = Binary;
	TREE_INDEX = 0;
	TREE_LEVEL = 0;
}

DISPLAY_LINE
{
	CHANNEL = "rst_n";
	EXPAND_STATUS = COLLAPSED;
	RADIX = Binary;
	TREE_INDEX = 1;
	TREE_LEVEL = 0;
}

DISPLAY_LINE
{
	CHANNEL = "count";
	EXPAND_STATUS = COLLAPSED;
	RADIX = Hexadecimal;
	TREE_INDEX = 2;
	TREE_LEVEL = 0;
	CHILDREN = 3, 4;
}

DISPLAY_LINE
{
	CHANNEL = "count[1]";
	EXPAND_STATUS = COLLAPSED;
	RADIX = Hexadecimal;
	TREE_INDEX = 3;
	TREE_LEVEL = 1;
	PARENT = 2;
}

DISPLAY_LINE
{
	CHANNEL = "count[0]";
	EXPAND_STATUS = COLLAPSED;
	RADIX = Hexadecimal;
	TREE_INDEX = 4;
	TREE_LEVEL = 1;
	PARENT = 2;
}

TIME_BAR
{
	TIME = 0;
	MASTER = TRUE;
}
;
"#;

#[test]
fn test_rows_output() {
    let out = render_vwf(COUNTER_VWF, &RenderOptions::default(), OutputMode::Rows).unwrap();
    assert_eq!(
        out,
        "clk & 1L 1C 1C 1C 1C 1C 1C 1C \\\\\n\
         rst\\_n & 2H 6L \\\\\n\
         count & 2D{X} 2D{0} 2D{1} 2D{2} \\\\\n\
         \\extracode\n\
         \\vertlines[help lines]{1,3,5,7}\n"
    );
}

#[test]
fn test_output_is_deterministic() {
    let options = RenderOptions::default();
    let first = render_vwf(COUNTER_VWF, &options, OutputMode::Document).unwrap();
    let second = render_vwf(COUNTER_VWF, &options, OutputMode::Document).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_viewport_and_grid() {
    let options = RenderOptions::new()
        .with_viewport(20_000, 60_000)
        .with_grid(true)
        .with_clock_no_slope(false);
    let out = render_vwf(COUNTER_VWF, &options, OutputMode::Rows).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "clk & 1L 1H 1L 1H \\\\");
    assert_eq!(lines[1], "rst\\_n & 4L \\\\");
    assert_eq!(lines[2], "count & 2D{0} 2D{1} \\\\");
    assert_eq!(&lines[3..], ["\\extracode", "\\tablegrid", "\\vertlines[help lines]{1,3}"]);
}

#[test]
fn test_expanded_bus_shows_bits() {
    let text = COUNTER_VWF.replacen(
        "CHANNEL = \"count\";\n\tEXPAND_STATUS = COLLAPSED;",
        "CHANNEL = \"count\";\n\tEXPAND_STATUS = EXPANDED;",
        1,
    );
    let options = RenderOptions::new().with_clock_lines(None);
    let out = render_vwf(&text, &options, OutputMode::Rows).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[3], "count[1] & 2X 4L 2H \\\\");
    assert_eq!(lines[4], "count[0] & 2X 2L 2H 2L \\\\");
}

#[test]
fn test_decimal_radix_rejects_unknown_bits() {
    let options = RenderOptions::new().with_radix_override("count", "Unsigned");
    let err = render_vwf(COUNTER_VWF, &options, OutputMode::Rows).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, VwfError::FormatterError { ref node, time: 0, .. } if node == "count"));
}

fn gray(value: u128, mask: u128, _width: u32) -> vwf2tikz::format::FormatResult {
    if mask != 0 {
        return Ok("?".to_string());
    }
    Ok(format!("g{}", value ^ (value >> 1)))
}

#[test]
fn test_custom_radix_bus_row() {
    let options = RenderOptions::new()
        .with_formatter("Gray", gray)
        .with_radix_override("count", "Gray");
    let out = render_vwf(COUNTER_VWF, &options, OutputMode::Rows).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[2], "count & 2D{?} 2D{g0} 2D{g1} 2D{g3} \\\\");
}

#[test]
fn test_custom_formatter_error_carries_node_and_time() {
    let options = RenderOptions::new()
        .with_formatter("Gray", |value: u128, mask: u128, width: u32| -> vwf2tikz::format::FormatResult {
            if value == 2 {
                return Err("no code for 2".to_string());
            }
            gray(value, mask, width)
        })
        .with_radix_override("count", "Gray");
    let err = render_vwf(COUNTER_VWF, &options, OutputMode::Rows).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        VwfError::FormatterError { ref node, time: 60_000, ref radix, ref message }
            if node == "count" && radix == "Gray" && message == "no code for 2"
    ));
}

#[test]
fn test_convert_file_document() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("counter.vwf");
    let output = dir.path().join("counter.tex");
    fs::write(&input, COUNTER_VWF).unwrap();

    convert_file(&input, &output, &RenderOptions::default(), OutputMode::Document).unwrap();

    let tex = fs::read_to_string(&output).unwrap();
    assert!(tex.starts_with("\\documentclass"));
    assert!(tex.contains("\\begin{tikztimingtable}"));
    assert!(tex.contains("count & 2D{X} 2D{0} 2D{1} 2D{2} \\\\"));
    assert!(tex.trim_end().ends_with("\\end{document}"));
}

#[test]
fn test_convert_file_failure_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.vwf");
    let output = dir.path().join("broken.tex");
    fs::write(&input, COUNTER_VWF.replace("TRANSITION_LIST(\"clk\")\n{", "TRANSITION_LIST(\"clk\")\n")).unwrap();

    let err = convert_file(&input, &output, &RenderOptions::default(), OutputMode::Graphic).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(!output.exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let err = convert_file(
        &dir.path().join("absent.vwf"),
        &dir.path().join("out.tex"),
        &RenderOptions::default(),
        OutputMode::Rows,
    )
    .unwrap_err();
    assert!(matches!(err, VwfError::FileReadError { .. }));
}
