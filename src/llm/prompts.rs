/// Reasoner: asks for a step-by-step answer to the question
pub const REASONING_TEMPLATE: &str = "You are solving a problem step-by-step. Each step must be accurate, \
and the reasoning must be clear and concise. \n\
For every computation, explicitly mention the steps taken. \n\
Question: {question}\n\
Answer (step-by-step):";

/// Refiner: reviews the reasoning and corrects it where needed
pub const REFINEMENT_TEMPLATE: &str = "Review the following reasoning and result carefully:\n\
Reasoning so far:\n{intermediate_answer}\n\
Verify all steps logically and re-compute if necessary. \
Provide a corrected final answer if needed and explain why it is correct.";

/// Verifier: double-checks the refined answer
pub const VERIFICATION_TEMPLATE: &str = "Final verification:\n\
{final_answer}\n\
Double-check the computation, verify the reasoning, and confirm if the answer is indeed correct. \
If correct, respond 'Verified: [answer]'. If not, explain the error and correct it.";

pub const QUESTION_KEY: &str = "question";
pub const INTERMEDIATE_ANSWER_KEY: &str = "intermediate_answer";
pub const FINAL_ANSWER_KEY: &str = "final_answer";
pub const VERIFIED_ANSWER_KEY: &str = "verified_answer";

/// Question asked when none is given on the command line
pub const EXAMPLE_QUESTION: &str = "Count the number of 'R's in the given string 'Strawberry'.";
