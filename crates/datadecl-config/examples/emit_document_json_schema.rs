use datadecl_config::document_json_schema;

fn main() {
    let schema = document_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize document json schema");
    println!("{json}");
}
