//! Prompt for code explanations.

/// Build the explanation prompt for `code` solving `title`.
///
/// Asks for a fixed layout so explanations read the same across problems.
pub fn explanation_prompt(code: &str, title: &str) -> String {
    format!(
        "Problem: {title}\n\
         \n\
         Solution Approach:\n\
         \n\
         Logic Explanation based on code:\n\
         {code}\n\
         \n\
         Now give the response in the following format:\n\
         \n\
         Problem: [Problem Name and Number]\n\
         Solution Approach: [Brute Force/Optimized]\n\
         Logic Explanation based on code:\n\
         [Your explanation here]\n\
         \n\
         Complexity Analysis:\n\
         \n\
         Time Complexity: O([complexity])\n\
         [Brief explanation of why this is the time complexity]\n\
         \n\
         Space Complexity: O([complexity])\n\
         [Brief explanation of memory usage]\n\
         [Note any additional data structures created]\n"
    )
}
