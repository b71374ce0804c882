pub fn grounded_answer_prompt(context: &str, question: &str) -> String {
    // Contract: context only, terse answer, literal fallback when unsupported.
    format!(
        r#"Answer the following question **strictly using the context provided**.
Avoid explanations, thoughts, or assumptions. Just give a clear and concise answer.
If the answer is not in the context, say "I don't know."

Context:
{context}

Question: {question}
Answer:"#
    )
}
