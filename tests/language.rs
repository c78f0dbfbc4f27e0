use std::fs;

use feelib::run_script;
use walkdir::WalkDir;

#[test]
fn book_examples_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("book/src").into_iter()
                                .filter_map(Result::ok)
                                .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (i, code) in extract_feel_blocks(&content).into_iter().enumerate() {
            count += 1;
            if let Err(e) = run_script(&code, false) {
                panic!("Example {} in {:?} failed:\n{}\nError: {}", i + 1, path, code, e);
            }
        }
    }

    assert!(count > 0, "No feel examples found in book/src");
}

fn extract_feel_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inside = false;
    let mut buf = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```feel") {
            inside = true;
            buf.clear();
            continue;
        }
        if inside && trimmed.starts_with("```") {
            inside = false;
            blocks.push(buf.clone());
            continue;
        }
        if inside {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    blocks
}

fn assert_success(src: &str) {
    if let Err(e) = run_script(src, false) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    assert!(run_script(src, false).is_err(), "Script succeeded but was expected to fail");
}

#[test]
fn decimal_arithmetic() {
    assert_success(r#"number ["1.500"] => 1.5"#);
    assert_success(r#"string [1.500] => "1.5""#);
    assert_success("decimal [2.5, 0] => 2");
    assert_success("decimal [3.5, 0] => 4");
    assert_success("decimal [1.125, 2] => 1.12");
    assert_success("sum [0.1, 0.2] => 0.3");
    assert_success("mean [[1, 2]] => 1.5");
    assert_success("ceiling [1.1] => 2");
    assert_success("floor [-1.1] => -2");
}

#[test]
fn aggregates_have_list_and_variadic_forms() {
    assert_success("min [[3, 1, 2]] => 1\nmin [3, 1, 2] => 1");
    assert_success(r#"max ["a", "c", "b"] => "c""#);
    assert_success("sum [[]] => null\nsum [null] => null");
    assert_success(r#"sum [1, "2"] => null"#);
}

#[test]
fn three_valued_logic() {
    assert_success("and [[true, true, true]] => true");
    assert_success("and [[true, false, true]] => false");
    assert_success("and [[true, null, true]] => null");
    assert_success("or [[false, null, true]] => true");
    assert_success("or [[false, null]] => null");
    assert_success("all [true, 1] => null");
    assert_success("any [false, false] => false");
    assert_success("not [null] => null");
}

#[test]
fn strings() {
    assert_success(r#"substring ["foobar", -2] => "ar""#);
    assert_success(r#"substring ["foobar", 3] => "obar""#);
    assert_success(r#"substring ["foobar", 0] => null"#);
    assert_success(r#"substring after ["foobar", "x"] => """#);
    assert_success(r#"upper case ["straße"] => "STRASSE""#);
    assert_success(r#"replace ["abc", "b", "[$0]"] => "a[b]c""#);
    assert_success(r#"matches ["abc", "["] => null"#);
}

#[test]
fn lists() {
    assert_success("elementAt [[1, 2, 3], -1] => 3");
    assert_success("elementAt [[1, 2, 3], 4] => null");
    assert_success("sublist [[1, 2, 3, 4, 5], 2, 2] => [2, 3]");
    assert_success("flatten [[1, [2, [3, 4]], 5]] => [1, 2, 3, 4, 5]");
    assert_success("flattenFirstLevel [[1, [2, [3, 4]], 5]] => [1, 2, [3, 4], 5]");
    assert_success("distinct values [[1, 2, 2, 3, 1]] => [1, 2, 3]");
    assert_success("rangeToList [true, 1, true, 5] => [2, 3, 4]");
    assert_success(r#"sort [[3, 1, 2], {"@lessThan": "<"}] => [1, 2, 3]"#);
}

#[test]
fn temporal_values() {
    assert_success(r#"date and time [{"@date": "2024-01-01"}, {"@time": "10:00:00"}] => {"@dateAndTime": "2024-01-01T10:00:00Z"}"#);
    assert_success(r#"years and months duration [{"@date": "2024-01-31"}, {"@date": "2024-03-01"}] => {"@duration": "P1M"}"#);
    assert_success(r#"duration ["P1YT1H"] => null"#);
    assert_success(r#"time offset [{"@time": "10:00:00-05:00"}] => {"@duration": "-PT5H"}"#);
}

#[test]
fn malformed_scripts_fail() {
    assert_failure("nope [1]");
    assert_failure("count 1");
    assert_failure("count [1,");
    assert_failure(r#"date [{"@date": "2024-02-30"}]"#);
    assert_failure("count [[1]] => 2");
}
