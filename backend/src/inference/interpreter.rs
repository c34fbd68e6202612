use serde_json::Value;
use shared::WorkflowOutput;

/// `None` means the strategy's field is absent and the next one is tried.
/// `Some(label)` ends the chain, even when `label` itself is `None`.
type Extraction = fn(&WorkflowOutput) -> Option<Option<&str>>;

/// Tried in order; the first strategy that finds its field wins.
const EXTRACTIONS: [Extraction; 2] = [from_model_predictions, from_top_class];

// A `class` key of any JSON type claims the result; only strings are labels.
fn from_model_predictions(output: &WorkflowOutput) -> Option<Option<&str>> {
    let class = output.first_prediction()?.class.as_ref()?;
    Some(class.as_str())
}

fn from_top_class(output: &WorkflowOutput) -> Option<Option<&str>> {
    output.top_class.as_deref().map(Some)
}

/// Picks the predicted class out of a workflow's `outputs` value.
///
/// Only the first element of the sequence is considered. An empty label
/// counts as no label at all.
pub fn interpret(outputs: &Value) -> Option<String> {
    let first = outputs.as_array()?.first()?;
    let output = WorkflowOutput::from_value(first)?;

    EXTRACTIONS
        .iter()
        .find_map(|extract| extract(&output))
        .flatten()
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_predictions_win() {
        let outputs = json!([{
            "$steps.model.predictions": {"predictions": [{"class": "ginger", "confidence": 0.9}]},
            "top_class": "oreo"
        }]);
        assert_eq!(interpret(&outputs).as_deref(), Some("ginger"));
    }

    #[test]
    fn top_class_is_the_fallback() {
        assert_eq!(interpret(&json!([{"top_class": "oreo"}])).as_deref(), Some("oreo"));
    }

    #[test]
    fn prediction_without_class_falls_back_to_top_class() {
        let outputs = json!([{
            "$steps.model.predictions": {"predictions": [{"confidence": 0.4}]},
            "top_class": "marie"
        }]);
        assert_eq!(interpret(&outputs).as_deref(), Some("marie"));

        let outputs = json!([{
            "$steps.model.predictions": {"predictions": []},
            "top_class": "marie"
        }]);
        assert_eq!(interpret(&outputs).as_deref(), Some("marie"));
    }

    #[test]
    fn present_class_stops_the_chain_whatever_its_value() {
        for class in [Value::Null, json!(7), json!({"name": "ginger"})] {
            let outputs = json!([{
                "$steps.model.predictions": {"predictions": [{"class": class.clone()}]},
                "top_class": "marie"
            }]);
            assert_eq!(interpret(&outputs), None, "class = {}", class);
        }
    }

    #[test]
    fn only_the_first_result_counts() {
        let outputs = json!([{}, {"top_class": "oreo"}]);
        assert_eq!(interpret(&outputs), None);
    }

    #[test]
    fn empty_or_unshaped_outputs_give_nothing() {
        assert_eq!(interpret(&json!([{}])), None);
        assert_eq!(interpret(&json!([])), None);
        assert_eq!(interpret(&json!({"top_class": "oreo"})), None);
        assert_eq!(interpret(&json!("oreo")), None);
        assert_eq!(interpret(&Value::Null), None);
        assert_eq!(interpret(&json!(["oreo"])), None);
    }

    #[test]
    fn empty_winning_label_does_not_fall_through() {
        let outputs = json!([{
            "$steps.model.predictions": {"predictions": [{"class": ""}]},
            "top_class": "oreo"
        }]);
        assert_eq!(interpret(&outputs), None);
    }
}
