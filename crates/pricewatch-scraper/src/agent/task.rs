//! Task text and output schema sent to the browsing agent.

use serde_json::{json, Value};

const URL_PLACEHOLDER: &str = "{url}";

const TASK_TEMPLATE: &str = "\
Scrape the product information from the page at {url} and return it in a structured format.

Steps:
1. Open {url} in the browser.
2. Read the product title and the displayed price, including its currency symbol.
3. Determine whether the product can currently be bought.
4. Find the URL of the main product image.
5. Collect extra details such as the offer text or the sold-out message.

Return ONLY a JSON object of this shape:
{
    \"title\": \"<product title>\",
    \"price\": \"<price exactly as displayed, with currency symbol>\",
    \"currency\": \"<currency code>\",
    \"availability\": <true or false>,
    \"image_url\": \"<main image URL>\",
    \"additional_data\": {
        \"offer\": \"<offer text>\",
        \"sold_out_text\": \"<sold-out text>\"
    }
}

Requirements:
- Output the JSON object only. No markdown code fences, no commentary.
- Every value is a string except availability, which is a boolean.
- additional_data must be an object; use {} when there is nothing to report.
";

/// Fills the task template with `url`. The URL is the only parameter.
#[must_use]
pub fn render(url: &str) -> String {
    TASK_TEMPLATE.replace(URL_PLACEHOLDER, url)
}

/// JSON Schema of the object the agent must return.
#[must_use]
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "price", "currency", "availability", "image_url", "additional_data"],
        "properties": {
            "title": { "type": "string" },
            "price": { "type": "string" },
            "currency": { "type": "string" },
            "availability": { "type": "boolean" },
            "image_url": { "type": "string" },
            "additional_data": {
                "type": ["object", "null"],
                "additionalProperties": { "type": ["string", "null"] }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_every_placeholder() {
        let task = render("https://shop.example.com/p/1");
        assert!(!task.contains(URL_PLACEHOLDER));
        assert_eq!(task.matches("https://shop.example.com/p/1").count(), 2);
    }

    #[test]
    fn schema_requires_all_fields() {
        let schema = output_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(
            required,
            ["title", "price", "currency", "availability", "image_url", "additional_data"]
        );
    }
}
