//! Static descriptions and complexity figures for each algorithm, used only for display.

use crate::model::AlgorithmId;

#[derive(Debug, Clone, Copy)]
pub struct TimeComplexity {
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub time: TimeComplexity,
    pub space: &'static str,
}

const BUBBLE: AlgorithmInfo = AlgorithmInfo {
    name: "Bubble Sort",
    description: "Repeatedly steps through the list, compares adjacent elements and swaps them \
                  if they are in the wrong order. Each pass bubbles the largest remaining value \
                  to the end.",
    time: TimeComplexity {
        best: "O(n)",
        average: "O(n²)",
        worst: "O(n²)",
    },
    space: "O(1)",
};

const INSERTION: AlgorithmInfo = AlgorithmInfo {
    name: "Insertion Sort",
    description: "Builds the sorted prefix one element at a time, shifting larger predecessors \
                  right until the current value fits.",
    time: TimeComplexity {
        best: "O(n)",
        average: "O(n²)",
        worst: "O(n²)",
    },
    space: "O(1)",
};

const SELECTION: AlgorithmInfo = AlgorithmInfo {
    name: "Selection Sort",
    description: "Finds the minimum of the unsorted suffix and swaps it into the next position \
                  of the sorted prefix.",
    time: TimeComplexity {
        best: "O(n²)",
        average: "O(n²)",
        worst: "O(n²)",
    },
    space: "O(1)",
};

const MERGE: AlgorithmInfo = AlgorithmInfo {
    name: "Merge Sort",
    description: "Divide and conquer: splits the list in half, sorts each half recursively and \
                  merges the two sorted halves with a temporary buffer.",
    time: TimeComplexity {
        best: "O(n log n)",
        average: "O(n log n)",
        worst: "O(n log n)",
    },
    space: "O(n)",
};

const QUICK: AlgorithmInfo = AlgorithmInfo {
    name: "Quick Sort",
    description: "Partitions the list around a pivot so smaller values end up on the left and \
                  larger values on the right, then sorts both partitions recursively.",
    time: TimeComplexity {
        best: "O(n log n)",
        average: "O(n log n)",
        worst: "O(n²)",
    },
    space: "O(log n)",
};

const RADIX: AlgorithmInfo = AlgorithmInfo {
    name: "Radix Sort",
    description: "Non-comparative sort that distributes values into buckets digit by digit, \
                  starting from the least significant digit.",
    time: TimeComplexity {
        best: "O(nk)",
        average: "O(nk)",
        worst: "O(nk)",
    },
    space: "O(n + k)",
};

pub fn info(id: AlgorithmId) -> &'static AlgorithmInfo {
    match id {
        AlgorithmId::Bubble => &BUBBLE,
        AlgorithmId::Insertion => &INSERTION,
        AlgorithmId::Selection => &SELECTION,
        AlgorithmId::Merge => &MERGE,
        AlgorithmId::Quick => &QUICK,
        AlgorithmId::Radix => &RADIX,
    }
}
