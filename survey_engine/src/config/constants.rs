pub mod compile_time {
    pub mod condition {
        /// Maximum length of a raw condition string, in bytes
        /// RESOURCE: bounds tokenizer work for a single visibility check
        pub const MAX_CONDITION_LENGTH: usize = 2_048;

        /// Maximum number of atomic terms in one condition
        /// RESOURCE: keeps evaluation proportional to section size
        pub const MAX_CONDITION_ATOMS: usize = 64;

        /// Connective for conjunction (binds tighter)
        pub const AND_KEYWORD: &str = "ET";

        /// Connective for disjunction
        pub const OR_KEYWORD: &str = "OU";

        /// Not-equal operator, checked before `=`
        pub const NOT_EQUAL_OPERATOR: &str = "<>";

        pub const EQUAL_OPERATOR: &str = "=";

        /// Characters stripped around keys, values and whole conditions
        pub const QUOTE_CHARS: [char; 2] = ['"', '\''];
    }

    pub mod structure {
        /// Maximum number of questions in a single section
        pub const MAX_SECTION_QUESTIONS: usize = 1_000;

        /// Section name that is never offered as a selectable phase
        pub const RESERVED_PHASE_SECTION: &str = "phase";
    }

    pub mod validation {
        /// Reserved question id holding the photo-count justification
        pub const DEFAULT_COMMENT_QUESTION_ID: u32 = 100;

        /// Label used in missing-field messages for the justification answer
        pub const COMMENT_LABEL: &str = "Commentaire";

        /// Upper bound on the expected photos per question a rule may produce
        pub const MAX_EXPECTED_PHOTOS_PER_QUESTION: u32 = 10_000;
    }
}
