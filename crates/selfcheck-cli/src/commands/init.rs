//! The `selfcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("selfcheck.toml").exists() {
        println!("selfcheck.toml already exists, skipping.");
    } else {
        std::fs::write("selfcheck.toml", SAMPLE_CONFIG)?;
        println!("Created selfcheck.toml");
    }

    let dataset_path = std::path::Path::new("course-questions.tsv");
    if dataset_path.exists() {
        println!("course-questions.tsv already exists, skipping.");
    } else {
        std::fs::write(dataset_path, EXAMPLE_DATASET)?;
        println!("Created course-questions.tsv");
    }

    println!("\nNext steps:");
    println!("  1. Edit course-questions.tsv with your questions");
    println!("  2. Run: selfcheck validate");
    println!("  3. Run: selfcheck check --week 1 --task 1 --answers 10");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# selfcheck configuration

[dataset]
# File path or http(s) URL; ${VAR} references are expanded.
source = "course-questions.tsv"
# Column separator and separator inside list fields.
delimiter = "\t"
list_delimiter = ","

[grading]
# "percent": tolerance is a percentage of the expected value.
# "absolute": tolerance is a plain difference.
mode = "percent"
default_tolerance = 0.1
close_pct = 5.0
directional_pct = 20.0
"#;

const EXAMPLE_DATASET: &str = "week\ttask\ttags\tunique-variant\tquestion\tfield-answers\tfield-number\tfield-names\ttolerance
1\t1\t\tno\tA train travels 50 km in half an hour.\\nWhat is its average speed in km/h?\t100\t1\tSpeed (km/h)\t1
1\t2\t\tyes\tSplit the group budget between rent and supplies.\\nUse the numbers of your variant.\t5,6,7,8\t2\tRent,Supplies\t1
1\t2\tbonus\tno\tCompute x such that 2x + 4 = 24.\t10\t1\tx\t
2\t1.1\t\tno\tA rectangle is 3 m by 4 m.\\nGive its area and its diagonal.\t12,5\t2\tArea (m2),Diagonal (m)\t0.5
";
