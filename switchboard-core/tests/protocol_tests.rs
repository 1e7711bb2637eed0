use serde_json::json;
use switchboard_core::protocol::{
    CallRequest, CallResult, ChatInput, CostBreakdown, MessageRole, ModelSpec, Origin,
    ResponseMode, UsageStats,
};

#[test]
fn test_success_result_wire_shape() {
    let request = CallRequest::with_call_id(
        "call-9",
        ModelSpec::new("anthropic", "claude-3-5-sonnet-20240620"),
        ChatInput::new("sys", "hi"),
        Origin {
            billing_id: "bill-9".into(),
            ..Default::default()
        },
    );
    let usage = UsageStats {
        model_name: "claude-3-5-sonnet-20240620".into(),
        input_token_count: 2000,
        output_token_count: 1000,
        costs: CostBreakdown {
            input: 0.006,
            output: 0.015,
            total: 0.021,
        },
    };

    let result = CallResult::success(&request, json!({"status": "ok"}), usage);
    assert!(!result.is_error());
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "callID": "call-9",
            "billingID": "bill-9",
            "message": {"status": "ok"},
            "usage": {
                "modelName": "claude-3-5-sonnet-20240620",
                "inputTokenCount": 2000,
                "outputTokenCount": 1000,
                "costs": {"input": 0.006, "output": 0.015, "total": 0.021}
            }
        })
    );
}

#[test]
fn test_minimal_request_uses_defaults() {
    let request: CallRequest = serde_json::from_value(json!({
        "callID": "c",
        "model": {"provider": "OpenAI", "modelName": "gpt-4o"},
        "chat": {"userPrompt": "hello"},
        "origin": {}
    }))
    .unwrap();

    assert_eq!(request.model.response_mode, ResponseMode::Text);
    assert_eq!(request.model.temperature, None);
    assert!(request.chat.system_prompt.is_empty());
    assert!(request.chat.message_context.is_empty());
    assert_eq!(request.origin.user_id, None);
}

#[test]
fn test_history_roles_deserialize() {
    let chat: ChatInput = serde_json::from_value(json!({
        "systemPrompt": "s",
        "userPrompt": "u",
        "messageHistory": [
            {"role": "system", "content": "note"},
            {"role": "user", "content": "q"},
            {"role": "assistant", "content": "a"}
        ],
        "messageContext": "some retrieved text"
    }))
    .unwrap();

    let roles: Vec<_> = chat.message_history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
    );
    assert_eq!(chat.message_context.render(), "some retrieved text");
}

#[test]
fn test_generated_call_ids_are_unique() {
    let make = || {
        CallRequest::new(
            ModelSpec::new("groq", "m"),
            ChatInput::default(),
            Origin::default(),
        )
    };
    assert_ne!(make().call_id, make().call_id);
}

#[test]
fn test_null_chat_fields_read_as_empty() {
    let chat: ChatInput = serde_json::from_value(json!({
        "systemPrompt": null,
        "userPrompt": "u",
        "messageHistory": null,
        "messageContext": null
    }))
    .unwrap();

    assert!(chat.system_prompt.is_empty());
    assert_eq!(chat.user_prompt, "u");
    assert!(chat.message_history.is_empty());
    assert!(chat.message_context.is_empty());
}
