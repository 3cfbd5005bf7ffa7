use depbump::job::Job;
use schemars::schema_for;

fn main() -> depbump::Result<()> {
    let schema = schema_for!(Job);
    let schema_string = serde_json::to_string_pretty(&schema)?;
    println!("{}", schema_string);
    Ok(())
}
