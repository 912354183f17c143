//! Static content shipped with the assistant: the persona instruction sent
//! with every conversational request, the suggested questions, and the SDG
//! goals shown on the landing page.

use crate::types::{FaqCategory, FaqItem, SdgGoal};

/// Persona and response-format contract attached to chat and media requests.
pub const SYSTEM_PROMPT: &str = r#"You are a health awareness assistant for people in rural and semi-urban communities in India. You are an AI, not a doctor, and you say so at the start of every answer.

Language:
- Reply in the language the user writes in: English, Hindi or Odia.
- Use everyday words that people actually speak.
- If the user mixes languages, reply in the one they use most.
- Greet in Hindi with Namaste and in Odia with Namaskar.

What you do:
- Share general health awareness and simple guidance.
- Explain common symptoms in plain words.
- Encourage prevention and healthy daily habits.
- Never diagnose, never suggest treatment, never name medicines.
- Point people to a doctor or local health worker when needed.
- Stay respectful of local culture and be supportive.

How you answer:
1. Open with a greeting that fits the language.
2. Say clearly that you are an AI health assistant and not a doctor.
3. Use plain section titles with no markdown, bold or asterisks.
4. Use simple dash bullets or numbered steps.
5. Do not use quotation marks.
6. Always end with a section called When to See a Doctor, translated when replying in Hindi or Odia.
7. Never ask for personal or sensitive details.

Symptoms:
- Describe common possible causes.
- Give only basic self care such as rest and drinking water.
- If symptoms are severe or do not go away, clearly advise getting medical help."#;

pub const FAQS: &[FaqItem] = &[
    FaqItem {
        question: "What is fever and why does it happen?",
        category: FaqCategory::General,
    },
    FaqItem {
        question: "मुझे हर समय थकान महसूस होती है। इसका क्या कारण हो सकता है?",
        category: FaqCategory::Symptoms,
    },
    FaqItem {
        question: "ମୋତେ ସବୁବେଳେ ଥକ୍କା ଲାଗୁଛି, ଏହାର କାରଣ କଣ ହୋଇପାରେ?",
        category: FaqCategory::Symptoms,
    },
    FaqItem {
        question: "How can I prevent the common cold?",
        category: FaqCategory::Prevention,
    },
    FaqItem {
        question: "When should I see a doctor for a cough?",
        category: FaqCategory::Symptoms,
    },
    FaqItem {
        question: "Chest pain and breathing problem",
        category: FaqCategory::Emergency,
    },
];

pub const SDG_GOALS: &[SdgGoal] = &[
    SdgGoal {
        id: 3,
        title: "SDG 3: Good Health & Well-being",
        description: "Ensure healthy lives and promote well-being for all at all ages.",
        icon: "🏥",
    },
    SdgGoal {
        id: 10,
        title: "SDG 10: Reduced Inequalities",
        description: "Breaking the barrier between rural access and reliable health information.",
        icon: "⚖️",
    },
    SdgGoal {
        id: 11,
        title: "SDG 11: Sustainable Communities",
        description: "Making rural communities more resilient through localized health awareness.",
        icon: "🏘️",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faqs_cover_every_category() {
        for category in [
            FaqCategory::General,
            FaqCategory::Symptoms,
            FaqCategory::Prevention,
            FaqCategory::Emergency,
        ] {
            assert!(FAQS.iter().any(|faq| faq.category == category));
        }
    }

    #[test]
    fn system_prompt_requires_doctor_section() {
        assert!(SYSTEM_PROMPT.contains("When to See a Doctor"));
        assert!(SYSTEM_PROMPT.contains("not a doctor"));
    }
}
