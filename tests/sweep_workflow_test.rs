use anyhow::Result;
use erun::domain::ports::LedgerStore;
use erun::{
    ExpansionSettings, FilterSpec, JsonlLedger, QueryEngine, SweepConfig, SweepError,
    SweepGenerator,
};
use std::collections::HashSet;
use tempfile::TempDir;

fn inputs(dir: &TempDir) -> Result<Vec<String>> {
    let input_dir = dir.path().join("inputs");
    std::fs::create_dir_all(&input_dir)?;
    let mut files = Vec::new();
    for name in ["input1", "input2"] {
        let path = input_dir.join(name);
        std::fs::write(&path, "")?;
        files.push(path.to_string_lossy().to_string());
    }
    Ok(files)
}

fn sweep_config(dir: &TempDir, params: &[&str]) -> Result<SweepConfig> {
    let results = dir.path().join("results");
    std::fs::create_dir_all(&results)?;
    Ok(SweepConfig::new("./experiment.py", results, inputs(dir)?)
        .with_params(params.iter().map(|s| s.to_string()).collect()))
}

/// 與原始工作流程相同：3 個 s 值 x 2 個 foo 值 x 2 個輸入檔
#[test]
fn test_end_to_end_sweep_and_query() -> Result<()> {
    let dir = TempDir::new()?;
    let config = sweep_config(&dir, &["-s", "range:0,10,5", "--foo", "set:bar,baz"])?;
    let output_dir = config.output_dir.clone();
    let input_files = config.inputs.clone();

    let mut generator = SweepGenerator::new(config, JsonlLedger::new(&output_dir), Vec::new());
    let records = generator.run()?;
    let (ledger, commands) = generator.into_parts();

    assert_eq!(records.len(), 12);
    assert_eq!(commands.len(), 12);
    assert_eq!(ledger.load_all()?.len(), 12);

    // 指令順序與帳本順序一致
    let stored = ledger.load_all()?;
    let stored_commands: Vec<&str> = stored.iter().map(|r| r.full_cmd.as_str()).collect();
    assert_eq!(stored_commands, commands.iter().map(String::as_str).collect::<Vec<_>>());

    let filter = FilterSpec::parse(&["-s", "set:0,5", "--foo", "bar"], &ExpansionSettings::default())?;
    let matches = QueryEngine::new(JsonlLedger::new(&output_dir)).run(&filter)?;

    assert_eq!(matches.len(), 2);
    let matched_inputs: HashSet<&str> = matches.iter().map(|r| r.infile.as_str()).collect();
    assert_eq!(matched_inputs.len(), 2);
    for input in &input_files {
        assert!(matched_inputs.contains(input.as_str()));
    }
    for record in &matches {
        assert_eq!(record.arg_value("foo"), Some("bar"));
        assert!(["0", "5"].contains(&record.arg_value("s").unwrap()));
    }

    Ok(())
}

#[test]
fn test_empty_filter_returns_whole_ledger_in_order() -> Result<()> {
    let dir = TempDir::new()?;
    let config = sweep_config(&dir, &["-s", "range:1,3", "--fast"])?;
    let output_dir = config.output_dir.clone();

    let mut generator = SweepGenerator::new(config, JsonlLedger::new(&output_dir), Vec::new());
    let generated = generator.run()?;

    let all = QueryEngine::new(JsonlLedger::new(&output_dir)).run(&FilterSpec::default())?;
    assert_eq!(all, generated);

    // solo 旗標以正規化名稱儲存，因此可以被過濾
    let fast = FilterSpec::parse(&["--fast"], &ExpansionSettings::default())?;
    let matched = QueryEngine::new(JsonlLedger::new(&output_dir)).run(&fast)?;
    assert_eq!(matched.len(), generated.len());

    let slow = FilterSpec::parse(&["--slow"], &ExpansionSettings::default())?;
    assert!(QueryEngine::new(JsonlLedger::new(&output_dir)).run(&slow)?.is_empty());

    Ok(())
}

#[test]
fn test_repeated_generation_appends_to_same_ledger() -> Result<()> {
    let dir = TempDir::new()?;
    let first = sweep_config(&dir, &["-s", "set:1,2"])?;
    let second = sweep_config(&dir, &["-s", "set:3,4", "-t", "x"])?;
    let output_dir = first.output_dir.clone();

    SweepGenerator::new(first, JsonlLedger::new(&output_dir), Vec::new()).run()?;
    SweepGenerator::new(second, JsonlLedger::new(&output_dir), Vec::new()).run()?;

    let records = JsonlLedger::new(&output_dir).load_all()?;
    assert_eq!(records.len(), 8);

    let with_t = FilterSpec::parse(&["-t", "x"], &ExpansionSettings::default())?;
    assert_eq!(QueryEngine::new(JsonlLedger::new(&output_dir)).run(&with_t)?.len(), 4);

    Ok(())
}

#[test]
fn test_regeneration_yields_identical_identifiers() -> Result<()> {
    let dir = TempDir::new()?;
    let config = sweep_config(&dir, &["-s", "set:1,2", "--foo", "bar"])?;
    let output_dir = config.output_dir.clone();

    let first = SweepGenerator::new(config.clone(), JsonlLedger::new(&output_dir), Vec::new()).run()?;
    let second = SweepGenerator::new(config, JsonlLedger::new(&output_dir), Vec::new()).run()?;

    let ids = |records: &[erun::core::InvocationRecord]| -> Vec<String> {
        records.iter().map(|r| r.outfile.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));

    Ok(())
}

#[test]
fn test_malformed_tokens_produce_no_output() -> Result<()> {
    let dir = TempDir::new()?;
    let config = sweep_config(&dir, &["-s", "1", "stray"])?;
    let output_dir = config.output_dir.clone();

    let mut generator = SweepGenerator::new(config, JsonlLedger::new(&output_dir), Vec::new());
    let err = generator.run().unwrap_err();
    assert!(matches!(err, SweepError::UnexpectedToken { .. }));

    let (ledger, commands) = generator.into_parts();
    assert!(commands.is_empty());
    assert!(!ledger.exists());

    Ok(())
}

#[test]
fn test_query_without_ledger_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let err = QueryEngine::new(JsonlLedger::new(dir.path()))
        .run(&FilterSpec::default())
        .unwrap_err();
    assert!(matches!(err, SweepError::LedgerNotFound { .. }));
    Ok(())
}
