use voice_order::domain::Transcript;

#[test]
fn given_several_segments_when_joining_then_uses_single_spaces_in_order() {
    let transcript = Transcript::from_segments(["dos camisas", "azules", "por favor"]);
    assert_eq!(transcript.as_str(), "dos camisas azules por favor");
}

#[test]
fn given_no_segments_when_joining_then_transcript_is_empty() {
    let transcript = Transcript::from_segments(Vec::<String>::new());
    assert!(transcript.is_empty());
    assert_eq!(transcript.into_string(), "");
}
